//! Deterministic command execution and reply rendering.
//!
//! Every reply is plain text; the transport envelope is applied later by the
//! response formatter. User-level failures (bad arguments, unknown ids) are
//! conversational and carry their reply text in the error.

use db::models::task::Task;

use crate::{
    AssistantError,
    intent::{Intent, TaskRef},
    store::{NewTask, TaskStore},
};

pub const NO_TASKS: &str = "No tienes tareas registradas.";
pub const NO_PENDING: &str = "¡No tienes tareas pendientes! 🎉";
pub const NO_COMPLETED: &str = "Aún no has completado ninguna tarea. ¡Tú puedes! 💪";
pub const GREETING: &str =
    "¡Hola! 👋 Soy tu asistente de tareas. Escribe \"ayuda\" para ver lo que puedo hacer.";

const COMMAND_LIST: &str = "\
• \"mis tareas\" o \"lista\" — ver todas tus tareas
• \"pendientes\" — ver lo que falta
• \"completadas\" — ver lo que ya terminaste
• \"resumen\" — estadísticas de tus tareas
• \"agregar: <título>\" — crear una tarea
• \"crear tarea <título>|<notas>|<pomodoros>\" — crear con detalle
• \"completar: <posición>\" — completar por posición en pendientes
• \"completar tarea <id>\" — completar por id
• \"eliminar tarea <id>\" — eliminar por id
• \"buscar: <texto>\" — buscar en títulos y notas";

pub fn help_reply() -> String {
    format!("🤖 Comandos disponibles:\n{COMMAND_LIST}\nCualquier otra cosa, pregúntamela y consulto a la IA.")
}

/// Fixed reply used when the AI backend is unavailable. The user always gets
/// the deterministic command list instead of a transport error.
pub fn fallback_reply() -> String {
    format!(
        "Ahora mismo no puedo consultar a la IA 😔. Estos comandos siempre funcionan:\n{COMMAND_LIST}"
    )
}

/// Execute a deterministic intent against the task store.
///
/// Free-form messages are routed to the AI delegate before execution reaches
/// here; the arm below only answers with the command list as a safety net.
pub async fn execute(intent: &Intent, store: &dyn TaskStore) -> Result<String, AssistantError> {
    match intent {
        Intent::Greeting => Ok(GREETING.to_string()),
        Intent::Help => Ok(help_reply()),
        Intent::ListAll => list_all(store).await,
        Intent::ListPending => list_filtered(store, false).await,
        Intent::ListCompleted => list_filtered(store, true).await,
        Intent::Summary => summary(store).await,
        Intent::AddTask {
            title,
            notes,
            pomodoros,
        } => add_task(store, title, notes, *pomodoros).await,
        Intent::CompleteTask(task_ref) => complete_task(store, *task_ref).await,
        Intent::DeleteTask(task_ref) => delete_task(store, *task_ref).await,
        Intent::SearchTask { term } => search_tasks(store, term).await,
        Intent::FreeForm { .. } => Ok(help_reply()),
    }
}

fn render_line(task: &Task) -> String {
    let glyph = if task.completed { "✔️" } else { "⏳" };
    format!("{glyph} {}. {} ({} 🍅)", task.id, task.title, task.pomodoros)
}

fn render_list(header: &str, tasks: &[Task]) -> String {
    let mut out = String::from(header);
    for task in tasks {
        out.push('\n');
        out.push_str(&render_line(task));
    }
    out
}

async fn list_all(store: &dyn TaskStore) -> Result<String, AssistantError> {
    let tasks = store.list_tasks().await?;
    if tasks.is_empty() {
        return Ok(NO_TASKS.to_string());
    }
    Ok(render_list("📋 Tus tareas:", &tasks))
}

async fn list_filtered(
    store: &dyn TaskStore,
    completed: bool,
) -> Result<String, AssistantError> {
    let tasks: Vec<Task> = store
        .list_tasks()
        .await?
        .into_iter()
        .filter(|t| t.completed == completed)
        .collect();
    if tasks.is_empty() {
        // Distinct from the generic empty message on purpose.
        return Ok(if completed { NO_COMPLETED } else { NO_PENDING }.to_string());
    }
    let header = if completed {
        "✅ Tareas completadas:"
    } else {
        "⏳ Tareas pendientes:"
    };
    Ok(render_list(header, &tasks))
}

async fn summary(store: &dyn TaskStore) -> Result<String, AssistantError> {
    let tasks = store.list_tasks().await?;
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    let pending = total - completed;
    let total_pomodoros: i64 = tasks.iter().map(|t| t.pomodoros).sum();
    let completed_pomodoros: i64 = tasks
        .iter()
        .filter(|t| t.completed)
        .map(|t| t.pomodoros)
        .sum();

    Ok(format!(
        "📊 Resumen de tareas\n\
         Total: {total}\n\
         Completadas: {completed}\n\
         Pendientes: {pending}\n\
         🍅 Pomodoros estimados: {total_pomodoros}\n\
         🍅 Pomodoros completados: {completed_pomodoros}"
    ))
}

async fn add_task(
    store: &dyn TaskStore,
    title: &str,
    notes: &str,
    pomodoros: i64,
) -> Result<String, AssistantError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AssistantError::InvalidCommand(
            "Falta el título de la tarea. Ejemplo: agregar: comprar leche".to_string(),
        ));
    }
    let task = store
        .insert_task(NewTask {
            title: title.to_string(),
            notes: notes.trim().to_string(),
            pomodoros: pomodoros.max(1),
        })
        .await?;
    Ok(format!(
        "✅ Tarea creada: {} ({} 🍅)",
        task.title, task.pomodoros
    ))
}

/// Resolve a 1-based position against the pending list, fetched fresh from
/// the store at the moment of resolution. Replies must never resolve a
/// position against an earlier, possibly stale, listing.
async fn resolve_position(store: &dyn TaskStore, position: i64) -> Result<Task, AssistantError> {
    let pending: Vec<Task> = store
        .list_tasks()
        .await?
        .into_iter()
        .filter(|t| !t.completed)
        .collect();
    if position < 1 || position as usize > pending.len() {
        return Err(AssistantError::NotFound(format!(
            "No tengo una tarea pendiente en la posición {position}."
        )));
    }
    Ok(pending[(position - 1) as usize].clone())
}

async fn complete_task(store: &dyn TaskStore, task_ref: TaskRef) -> Result<String, AssistantError> {
    let id = match task_ref {
        TaskRef::Position(position) => resolve_position(store, position).await?.id,
        TaskRef::Id(id) => id,
    };
    match store.update_task_status(id, true).await? {
        Some(task) => Ok(format!("💪 Tarea completada: {}", task.title)),
        None => Err(AssistantError::NotFound(format!(
            "No encontré una tarea con id {id}."
        ))),
    }
}

async fn delete_task(store: &dyn TaskStore, task_ref: TaskRef) -> Result<String, AssistantError> {
    let id = match task_ref {
        TaskRef::Position(position) => resolve_position(store, position).await?.id,
        TaskRef::Id(id) => id,
    };
    if store.delete_task(id).await? {
        Ok(format!("🗑️ Tarea {id} eliminada."))
    } else {
        Err(AssistantError::NotFound(format!(
            "No encontré una tarea con id {id}."
        )))
    }
}

async fn search_tasks(store: &dyn TaskStore, term: &str) -> Result<String, AssistantError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(AssistantError::InvalidCommand(
            "¿Qué quieres buscar? Ejemplo: buscar: leche".to_string(),
        ));
    }
    let needle = term.to_lowercase();
    let matches: Vec<Task> = store
        .list_tasks()
        .await?
        .into_iter()
        .filter(|t| {
            t.title.to_lowercase().contains(&needle) || t.notes.to_lowercase().contains(&needle)
        })
        .collect();
    if matches.is_empty() {
        return Ok(format!("No encontré tareas que contengan \"{term}\"."));
    }
    Ok(render_list(
        &format!("🔎 Resultados para \"{term}\":"),
        &matches,
    ))
}
