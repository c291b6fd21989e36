//! Staff scheduler
//!
//! Each tick, roughly `assignment_probability` of the staff pool is on
//! shift. The pass is a diff against the existing rows: a selected staff
//! member's single schedule row is upserted in place (new window, new
//! department), an unselected member's row is removed. The table is never
//! cleared wholesale.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::config::ScheduleConfig;
use crate::models::StaffSchedule;
use crate::rng::RngManager;
use crate::store::Store;

/// Outcome of one scheduling pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleReport {
    pub assigned: usize,
    pub removed: usize,
}

/// Reconcile schedule rows for the whole staff pool
pub fn run(
    store: &mut Store,
    config: &ScheduleConfig,
    rng: &mut RngManager,
    now: DateTime<Utc>,
) -> ScheduleReport {
    let mut report = ScheduleReport::default();

    let department_ids = store.departments().ids();
    if department_ids.is_empty() {
        debug!("scheduling skipped: no departments");
        return report;
    }

    // Shift window centered on now
    let half = Duration::hours(config.shift_hours) / 2;
    let shift_start = now - half;
    let shift_end = now + half;

    let roster: Vec<_> = store.staff().iter().map(|s| (s.id, s.role)).collect();
    for (staff_id, role) in roster {
        let existing = store.schedule_for_staff(staff_id).map(|s| s.id);

        if rng.chance(config.assignment_probability) {
            let department_id = *rng
                .pick(&department_ids)
                .expect("department list checked non-empty");

            match existing {
                Some(schedule_id) => {
                    if let Some(row) = store.staff_schedules_mut().get_mut(schedule_id) {
                        row.department_id = department_id;
                        row.shift_start = shift_start;
                        row.shift_end = shift_end;
                        row.role = role;
                    }
                }
                None => {
                    let row = StaffSchedule {
                        id: rng.uuid(),
                        staff_id,
                        department_id,
                        shift_start,
                        shift_end,
                        role,
                    };
                    if let Err(err) = store.staff_schedules_mut().insert(row) {
                        warn!(%staff_id, %err, "schedule insert failed");
                        continue;
                    }
                }
            }
            report.assigned += 1;
        } else if let Some(schedule_id) = existing {
            store.staff_schedules_mut().remove(schedule_id);
            report.removed += 1;
        }
    }

    report
}
