//! Shared text-mode rendering for `Task`/`Artifact` values. JSON mode
//! never touches this module — it renders the envelope directly.

use lattice_core::Task;

use crate::color;

pub fn print_task_line(task: &Task) {
    let id = task.short_id.as_deref().unwrap_or(&task.id);
    println!(
        "{:<14} {:<12} {:<8} {:<8} {}",
        id,
        color::status(&task.status),
        format!("{:?}", task.priority).to_lowercase(),
        format!("{:?}", task.urgency).to_lowercase(),
        task.title
    );
}

pub fn print_task_detail(task: &Task) {
    let id = task.short_id.as_deref().unwrap_or(&task.id);
    println!("{} {}", color::header(id), task.title);
    println!("  status:     {}", color::status(&task.status));
    println!("  type:       {}", task.task_type);
    println!("  priority:   {:?}", task.priority);
    println!("  urgency:    {:?}", task.urgency);
    if let Some(assigned) = &task.assigned_to {
        println!("  assigned:   {assigned}");
    }
    if !task.tags.is_empty() {
        println!("  tags:       {}", task.tags.join(", "));
    }
    println!("  created:    {}", task.created_at);
    println!("  updated:    {}", task.updated_at);
    if let Some(done_at) = task.done_at {
        println!("  done:       {done_at}");
    }
    if task.archived {
        println!("  {}", color::muted("(archived)"));
    }
    if !task.description.is_empty() {
        println!();
        println!("{}", task.description);
    }
    if !task.relationships_out.is_empty() {
        println!();
        println!("{}", color::header("Relationships"));
        for rel in &task.relationships_out {
            println!("  {} -> {}", rel.kind, rel.target_id);
        }
    }
    if !task.comments.is_empty() {
        println!();
        println!("{}", color::header("Comments"));
        for comment in &task.comments {
            if comment.deleted {
                continue;
            }
            let role = comment.role.as_deref().map(|r| format!(" [{r}]")).unwrap_or_default();
            println!("  {} ({}){role}: {}", comment.actor, comment.created_at, comment.body);
        }
    }
}
