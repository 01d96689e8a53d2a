use diesel::{prelude::*, PgConnection};

use crate::{
    object_id::ProjectId,
    schema::{projects, tasks},
};

/// Truncated integer mean of the task progress values, or 0 when there are no
/// tasks. Truncation, not rounding: [50, 51] averages to 50.
pub fn derived_progress(values: &[i32]) -> i32 {
    if values.is_empty() {
        return 0;
    }

    let sum = values.iter().map(|v| i64::from(*v)).sum::<i64>();
    (sum / values.len() as i64) as i32
}

/// Recompute a project's aggregate progress from its current tasks and persist
/// it onto the project row. Must run inside the same transaction as the task
/// mutation that triggered it. The project row is locked first, so a
/// concurrent mutation on the same project waits here and then reads the task
/// set including this transaction's committed writes.
pub fn recompute_project_progress(
    conn: &mut PgConnection,
    project_id: ProjectId,
) -> Result<i32, diesel::result::Error> {
    // Under READ COMMITTED, reading the tasks without this lock could miss a
    // concurrent transaction's uncommitted task and settle on a stale mean.
    // NO KEY UPDATE rather than UPDATE: the triggering insert's FK check
    // already holds KEY SHARE on this row, and a full UPDATE lock here would
    // deadlock two concurrent task creates.
    projects::table
        .filter(projects::id.eq(project_id))
        .select(projects::id)
        .for_no_key_update()
        .first::<ProjectId>(conn)?;

    let values = tasks::table
        .filter(tasks::project_id.eq(project_id))
        .select(tasks::progress)
        .load::<i32>(conn)?;

    let progress = derived_progress(&values);

    diesel::update(projects::table.filter(projects::id.eq(project_id)))
        .set(projects::progress.eq(progress))
        .execute(conn)?;

    Ok(progress)
}
