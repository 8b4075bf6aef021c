// Terminal rendering of the filtered view and stats

use crate::filter::{Stats, TaskFilter};
use crate::task::Task;
use colored::Colorize;

/// One line for a task: checkbox, id, text
pub fn render_task(task: &Task) -> String {
    if task.completed {
        format!(
            "{} {} {}",
            "[x]".green(),
            task.id.to_string().dimmed(),
            task.text.dimmed().strikethrough()
        )
    } else {
        format!("[ ] {} {}", task.id.to_string().dimmed(), task.text)
    }
}

/// The task list, or a message when the view is empty
pub fn render_list(tasks: &[&Task], filter: TaskFilter) -> String {
    if tasks.is_empty() {
        let message = match filter {
            TaskFilter::All => "No tasks yet. Add your first task above!".to_string(),
            other => format!("No {} tasks.", other),
        };
        return message.italic().to_string();
    }

    tasks.iter().map(|t| render_task(t)).collect::<Vec<_>>().join("\n")
}

pub fn render_stats(stats: &Stats) -> String {
    format!(
        "Total: {}  Completed: {}  Pending: {}",
        stats.total.to_string().bold(),
        stats.completed.to_string().green(),
        stats.pending.to_string().yellow()
    )
}
