//! Smart lists: Today, Upcoming, Inbox and Completed.

use crate::backend::{Query, Task, TaskLike};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::fmt;

/// The current day in the user's time zone, as a UTC half-open range.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayBounds {
    /// Bounds of the calendar day containing `now`, in `now`'s time zone.
    ///
    pub fn of<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let midnight = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .and_then(|naive| now.timezone().from_local_datetime(&naive).earliest())
            .map(|start| start.with_timezone(&Utc))
            .unwrap_or_else(|| now.with_timezone(&Utc));
        DayBounds {
            start: midnight,
            end: midnight + Duration::days(1),
        }
    }

    /// Bounds of today on the local clock.
    ///
    pub fn today() -> Self {
        DayBounds::of(&chrono::Local::now())
    }

    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        *at >= self.start && *at < self.end
    }
}

/// Built-in views over all of a user's tasks.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SmartList {
    Today,
    Upcoming,
    Inbox,
    Completed,
}

impl SmartList {
    pub const ALL: [SmartList; 4] = [
        SmartList::Today,
        SmartList::Upcoming,
        SmartList::Inbox,
        SmartList::Completed,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SmartList::Today => "Today",
            SmartList::Upcoming => "Upcoming",
            SmartList::Inbox => "Inbox",
            SmartList::Completed => "Completed",
        }
    }

    /// Parse a list name as typed on the command line.
    ///
    pub fn parse(name: &str) -> Option<SmartList> {
        SmartList::ALL
            .into_iter()
            .find(|list| list.title().eq_ignore_ascii_case(name))
    }

    /// Whether `task` belongs in this list.
    ///
    pub fn matches(&self, task: &Task, bounds: &DayBounds) -> bool {
        match self {
            SmartList::Today => {
                !task.completed && task.due_date.map_or(false, |due| bounds.contains(&due))
            }
            SmartList::Upcoming => {
                !task.completed && task.due_date.map_or(false, |due| due >= bounds.start)
            }
            SmartList::Inbox => !task.completed && task.project_id().is_none(),
            SmartList::Completed => task.completed,
        }
    }

    /// Backend queries selecting this list, in display order.
    ///
    pub fn queries(&self, bounds: &DayBounds) -> Vec<Query> {
        match self {
            SmartList::Today => vec![
                Query::equal("completed", false),
                Query::greater_than_equal("due_date", Query::timestamp(bounds.start)),
                Query::less_than("due_date", Query::timestamp(bounds.end)),
            ],
            SmartList::Upcoming => vec![
                Query::equal("completed", false),
                Query::greater_than_equal("due_date", Query::timestamp(bounds.start)),
                Query::order_asc("due_date"),
            ],
            SmartList::Inbox => vec![
                Query::equal("completed", false),
                Query::is_null("projectId"),
            ],
            SmartList::Completed => vec![
                Query::equal("completed", true),
                Query::order_desc("$updatedAt"),
            ],
        }
    }

    /// Select and order the tasks of this list from an unfiltered set.
    ///
    pub fn select(&self, tasks: &[Task], bounds: &DayBounds) -> Vec<Task> {
        let mut selected: Vec<Task> = tasks
            .iter()
            .filter(|task| self.matches(task, bounds))
            .cloned()
            .collect();
        match self {
            SmartList::Upcoming => selected.sort_by_key(|task| task.due_date),
            SmartList::Completed => {
                selected.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            }
            SmartList::Today | SmartList::Inbox => {}
        }
        selected
    }
}

impl fmt::Display for SmartList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Per-list task counts for the sidebar.
///
pub fn counts(tasks: &[Task], bounds: &DayBounds) -> [(SmartList, usize); 4] {
    SmartList::ALL.map(|list| {
        let count = tasks.iter().filter(|task| list.matches(task, bounds)).count();
        (list, count)
    })
}
