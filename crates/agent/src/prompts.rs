//! German system prompts for the two model calls.

use kfzroute_core::{CaseRecord, IntentCatalog};

pub fn classification_prompt(catalog: &IntentCatalog) -> String {
    let slug_list = catalog.slugs().collect::<Vec<_>>().join("\n- ");

    format!(
        "Du bist ein Intent-Klassifizierungs-System für eine KFZ-Zulassungsstelle.

Verfügbare Intent-Slugs:
- {slug_list}

Aufgabe: Bestimme welcher Slug am besten zur Benutzer-Anfrage passt.

Antworte NUR mit dem Slug (nichts anderes). Wenn keine Übereinstimmung gefunden wird, antworte mit \"unknown\"."
    )
}

pub fn answer_prompt(record: &CaseRecord) -> String {
    format!(
        "Du bist ein freundlicher Mitarbeiter einer KFZ-Zulassungsstelle.

Basierend auf den folgenden Informationen, beantworte die Frage des Benutzers klar und präzise:

TITEL: {title}

INHALT:
{body}

Antworte natürlich und hilfreich. Fasse dich kurz, aber bleibe vollständig.",
        title = record.title_text(),
        body = record.body_text(),
    )
}
