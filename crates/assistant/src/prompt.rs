//! System prompt template for the AI delegate.
//!
//! The template is versioned data, kept apart from control flow so wording
//! changes never touch the pipeline.

use db::models::task::Task;

/// Cap on how many tasks are embedded in the prompt context.
pub const MAX_CONTEXT_TASKS: usize = 25;

const INSTRUCTIONS: &str = "\
Eres un asistente personal de tareas estilo pomodoro.
- Responde siempre en español.
- Sé breve: tres frases como máximo.
- Mantén un tono amable y motivador.
- Si la pregunta trata de las tareas del usuario, apóyate en la lista de contexto.
- No inventes tareas que no estén en la lista.";

/// One line per task: status glyph plus title. Long lists are truncated
/// with an elision marker to keep the prompt bounded.
pub fn task_context(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "(sin tareas registradas)".to_string();
    }
    let mut lines: Vec<String> = tasks
        .iter()
        .take(MAX_CONTEXT_TASKS)
        .map(|t| {
            let glyph = if t.completed { "✔️" } else { "⏳" };
            format!("- {glyph} {}", t.title)
        })
        .collect();
    if tasks.len() > MAX_CONTEXT_TASKS {
        lines.push(format!("… y {} tareas más", tasks.len() - MAX_CONTEXT_TASKS));
    }
    lines.join("\n")
}

pub fn system_prompt(tasks: &[Task]) -> String {
    format!(
        "{INSTRUCTIONS}\n\nTareas actuales del usuario:\n{}",
        task_context(tasks)
    )
}
