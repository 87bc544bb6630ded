//! Message normalization and intent classification.
//!
//! Classification is an ordered rule cascade: rules are evaluated top-down
//! and the first match wins. Ambiguous keyword overlaps ("tareas" inside a
//! message that also says "pendiente") resolve by rule position, never by
//! specificity, so the order of [`RULES`] is part of the contract.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::AssistantError;

/// Trimmed message with a lower-cased copy for matching.
///
/// Literal content (titles, search terms) is always extracted from
/// `original`; lower-casing must never corrupt user-entered text.
#[derive(Debug, Clone)]
pub struct NormalizedMessage {
    pub lower: String,
    pub original: String,
}

/// How a command refers to a task. The two addressing schemes are distinct
/// and resolved by different functions; do not unify them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRef {
    /// 1-based position in the current pending list, re-fetched at
    /// resolution time.
    Position(i64),
    /// Literal store id.
    Id(i64),
}

/// The classified meaning of a user message.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Greeting,
    Help,
    ListAll,
    ListPending,
    ListCompleted,
    Summary,
    AddTask {
        title: String,
        notes: String,
        pomodoros: i64,
    },
    CompleteTask(TaskRef),
    DeleteTask(TaskRef),
    SearchTask {
        term: String,
    },
    FreeForm {
        text: String,
    },
}

pub fn normalize(raw: &str) -> Result<NormalizedMessage, AssistantError> {
    let original = raw.trim();
    if original.is_empty() {
        return Err(AssistantError::EmptyMessage);
    }
    Ok(NormalizedMessage {
        lower: original.to_lowercase(),
        original: original.to_string(),
    })
}

// Explicit command forms. Matched case-insensitively against the original
// text so captured arguments keep their case.
static ADD_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:agregar|crear|nueva):\s*(.*)$").unwrap());
static COMPLETE_BY_POSITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^completar:\s*(\d+)\s*$").unwrap());
static SEARCH_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^buscar:\s*(.*)$").unwrap());
static DELETE_BY_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^eliminar tarea\s+(\d+)\s*$").unwrap());
static CREATE_WITH_FIELDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^crear tarea\s+(.+)$").unwrap());
static COMPLETE_BY_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^completar tarea\s+(\d+)\s*$").unwrap());

const GREETING_KEYWORDS: &[&str] = &["hola", "hello", "hi", "buenas"];
const HELP_KEYWORDS: &[&str] = &["ayuda", "help", "comando"];
const SUMMARY_KEYWORDS: &[&str] = &["resumen", "estadistica", "estadística"];
const COMPLETED_KEYWORDS: &[&str] = &["completada", "terminada", "hecha"];
const PENDING_KEYWORDS: &[&str] = &["pendiente", "falta", "por hacer"];
const LIST_KEYWORDS: &[&str] = &["lista", "tareas", "task", "mis tareas"];

type RuleFn = fn(&NormalizedMessage) -> Option<Intent>;

/// The rule cascade, highest precedence first. Order is load-bearing.
static RULES: &[RuleFn] = &[
    explicit_command,
    greeting,
    help,
    summary,
    completed_filter,
    pending_filter,
    list_all,
];

/// Classify a normalized message into an [`Intent`]. Falls through to
/// [`Intent::FreeForm`] when no rule matches.
pub fn classify(msg: &NormalizedMessage) -> Intent {
    for rule in RULES {
        if let Some(intent) = rule(msg) {
            return intent;
        }
    }
    Intent::FreeForm {
        text: msg.original.clone(),
    }
}

fn explicit_command(msg: &NormalizedMessage) -> Option<Intent> {
    if let Some(caps) = ADD_PREFIX.captures(&msg.original) {
        return Some(Intent::AddTask {
            title: caps[1].trim().to_string(),
            notes: String::new(),
            pomodoros: 1,
        });
    }
    if let Some(caps) = COMPLETE_BY_POSITION.captures(&msg.original) {
        let position = caps[1].parse().ok()?;
        return Some(Intent::CompleteTask(TaskRef::Position(position)));
    }
    if let Some(caps) = SEARCH_PREFIX.captures(&msg.original) {
        return Some(Intent::SearchTask {
            term: caps[1].trim().to_string(),
        });
    }
    if let Some(caps) = DELETE_BY_ID.captures(&msg.original) {
        let id = caps[1].parse().ok()?;
        return Some(Intent::DeleteTask(TaskRef::Id(id)));
    }
    if let Some(caps) = CREATE_WITH_FIELDS.captures(&msg.original) {
        let (title, notes, pomodoros) = parse_pipe_fields(&caps[1]);
        return Some(Intent::AddTask {
            title,
            notes,
            pomodoros,
        });
    }
    if let Some(caps) = COMPLETE_BY_ID.captures(&msg.original) {
        let id = caps[1].parse().ok()?;
        return Some(Intent::CompleteTask(TaskRef::Id(id)));
    }
    None
}

/// Split the `crear tarea` argument on `|`: title, optional notes, optional
/// pomodoro estimate. The estimate is clamped to a minimum of 1; an absent
/// or unparseable third segment defaults to 1.
fn parse_pipe_fields(raw: &str) -> (String, String, i64) {
    let mut parts = raw.split('|').map(str::trim);
    let title = parts.next().unwrap_or("").to_string();
    let notes = parts.next().unwrap_or("").to_string();
    let pomodoros = parts
        .next()
        .and_then(|p| p.parse::<i64>().ok())
        .map(|p| p.max(1))
        .unwrap_or(1);
    (title, notes, pomodoros)
}

fn contains_any(lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| lower.contains(kw))
}

fn greeting(msg: &NormalizedMessage) -> Option<Intent> {
    contains_any(&msg.lower, GREETING_KEYWORDS).then_some(Intent::Greeting)
}

fn help(msg: &NormalizedMessage) -> Option<Intent> {
    contains_any(&msg.lower, HELP_KEYWORDS).then_some(Intent::Help)
}

fn summary(msg: &NormalizedMessage) -> Option<Intent> {
    contains_any(&msg.lower, SUMMARY_KEYWORDS).then_some(Intent::Summary)
}

fn completed_filter(msg: &NormalizedMessage) -> Option<Intent> {
    contains_any(&msg.lower, COMPLETED_KEYWORDS).then_some(Intent::ListCompleted)
}

fn pending_filter(msg: &NormalizedMessage) -> Option<Intent> {
    contains_any(&msg.lower, PENDING_KEYWORDS).then_some(Intent::ListPending)
}

fn list_all(msg: &NormalizedMessage) -> Option<Intent> {
    contains_any(&msg.lower, LIST_KEYWORDS).then_some(Intent::ListAll)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_text(text: &str) -> Intent {
        classify(&normalize(text).unwrap())
    }

    #[test]
    fn normalize_rejects_empty_messages() {
        assert!(matches!(
            normalize("   \n\t "),
            Err(AssistantError::EmptyMessage)
        ));
    }

    #[test]
    fn normalize_preserves_original_case() {
        let msg = normalize("  Agregar: Comprar Leche  ").unwrap();
        assert_eq!(msg.original, "Agregar: Comprar Leche");
        assert_eq!(msg.lower, "agregar: comprar leche");
    }

    #[test]
    fn add_prefixes_capture_verbatim_title() {
        for text in [
            "agregar: Comprar Leche",
            "crear: Comprar Leche",
            "nueva: Comprar Leche",
        ] {
            match classify_text(text) {
                Intent::AddTask {
                    title,
                    notes,
                    pomodoros,
                } => {
                    assert_eq!(title, "Comprar Leche");
                    assert_eq!(notes, "");
                    assert_eq!(pomodoros, 1);
                }
                other => panic!("{text:?} classified as {other:?}"),
            }
        }
    }

    #[test]
    fn add_prefix_with_empty_title_still_matches() {
        // Recognized command with malformed arguments; the executor rejects it.
        assert_eq!(
            classify_text("agregar:"),
            Intent::AddTask {
                title: String::new(),
                notes: String::new(),
                pomodoros: 1,
            }
        );
    }

    #[test]
    fn create_with_pipe_fields() {
        assert_eq!(
            classify_text("crear tarea Informe mensual | revisar cifras | 3"),
            Intent::AddTask {
                title: "Informe mensual".to_string(),
                notes: "revisar cifras".to_string(),
                pomodoros: 3,
            }
        );
    }

    #[test]
    fn pipe_pomodoros_clamped_and_defaulted() {
        match classify_text("crear tarea Informe | notas | 0") {
            Intent::AddTask { pomodoros, .. } => assert_eq!(pomodoros, 1),
            other => panic!("unexpected {other:?}"),
        }
        match classify_text("crear tarea Informe | notas | muchos") {
            Intent::AddTask { pomodoros, .. } => assert_eq!(pomodoros, 1),
            other => panic!("unexpected {other:?}"),
        }
        match classify_text("crear tarea Informe") {
            Intent::AddTask {
                pomodoros, notes, ..
            } => {
                assert_eq!(pomodoros, 1);
                assert_eq!(notes, "");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn position_and_id_references_stay_distinct() {
        assert_eq!(
            classify_text("completar: 2"),
            Intent::CompleteTask(TaskRef::Position(2))
        );
        assert_eq!(
            classify_text("completar tarea 7"),
            Intent::CompleteTask(TaskRef::Id(7))
        );
        assert_eq!(
            classify_text("eliminar tarea 7"),
            Intent::DeleteTask(TaskRef::Id(7))
        );
    }

    #[test]
    fn non_numeric_reference_is_not_a_command() {
        // Matches the original behavior: "completar tarea abc" falls through
        // the cascade instead of producing a malformed reference.
        assert!(matches!(
            classify_text("completar tarea abc"),
            Intent::FreeForm { .. }
        ));
    }

    #[test]
    fn search_keeps_term_case() {
        assert_eq!(
            classify_text("buscar: Leche"),
            Intent::SearchTask {
                term: "Leche".to_string()
            }
        );
    }

    #[test]
    fn keyword_rules_in_order() {
        assert_eq!(classify_text("hola"), Intent::Greeting);
        assert_eq!(classify_text("necesito ayuda"), Intent::Help);
        assert_eq!(classify_text("dame un resumen"), Intent::Summary);
        assert_eq!(classify_text("tareas completadas"), Intent::ListCompleted);
        assert_eq!(classify_text("que me falta"), Intent::ListPending);
        assert_eq!(classify_text("mis tareas"), Intent::ListAll);
    }

    #[test]
    fn pending_precedes_list_all() {
        // Precedence law: a message with both a pending keyword and a list
        // keyword resolves to the pending filter.
        assert_eq!(classify_text("tareas pendientes"), Intent::ListPending);
        assert_eq!(
            classify_text("muestrame la lista de pendientes"),
            Intent::ListPending
        );
    }

    #[test]
    fn completed_precedes_pending_and_list() {
        assert_eq!(
            classify_text("lista de tareas completadas y pendientes"),
            Intent::ListCompleted
        );
    }

    #[test]
    fn unmatched_text_is_free_form_with_original_case() {
        assert_eq!(
            classify_text("Como organizo mi semana?"),
            Intent::FreeForm {
                text: "Como organizo mi semana?".to_string()
            }
        );
    }
}
