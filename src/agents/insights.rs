use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};

use crate::routes::event::{EventResponse, EventStatus};
use crate::routes::group::GroupResponse;
use crate::routes::insights::{AttendanceInsights, DashboardInsights, EngagementInsights};
use crate::routes::member::MemberResponse;
use crate::routes::task::{TaskResponse, TaskStatus};
use crate::utils::Related;

const RECENT_ACTIVITY_LIMIT: usize = 10;
const TOP_EVENTS_LIMIT: usize = 5;

fn related(value: Value) -> Related {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// A member counts as engaged once they belong to a group or have
/// finished at least one task.
fn is_active(member: &MemberResponse) -> bool {
    !member.groups.is_empty() || member.tasks_completed > 0
}

fn month_totals(events: &[&EventResponse]) -> BTreeMap<String, i64> {
    let mut by_month = BTreeMap::new();
    for event in events {
        *by_month
            .entry(event.start_date.format("%Y-%m").to_string())
            .or_insert(0) += event.attendees_count;
    }
    by_month
}

/// Direction and percentage change between the two most recent months.
fn trend(by_month: &BTreeMap<String, i64>) -> Map<String, Value> {
    let mut recent = by_month.values().rev();
    let (last, previous) = (recent.next().copied(), recent.next().copied());
    let (direction, change) = match (last, previous) {
        (Some(last), Some(prev)) if prev > 0 => {
            let change = (last - prev) as f64 / prev as f64 * 100.0;
            let direction = if change > 0.0 {
                "up"
            } else if change < 0.0 {
                "down"
            } else {
                "flat"
            };
            (direction, Some(round2(change)))
        }
        (Some(last), Some(_)) if last > 0 => ("up", None),
        _ => ("flat", None),
    };
    related(json!({
        "direction": direction,
        "change_percent": change,
        "months": by_month.len(),
    }))
}

fn analyzed_events(events: &[EventResponse], now: DateTime<Utc>) -> Vec<&EventResponse> {
    events
        .iter()
        .filter(|e| e.status != EventStatus::Cancelled && e.start_date <= now)
        .collect()
}

pub fn attendance(events: &[EventResponse], now: DateTime<Utc>) -> AttendanceInsights {
    let analyzed = analyzed_events(events, now);
    let total: i64 = analyzed.iter().map(|e| e.attendees_count).sum();
    let average_attendance = if analyzed.is_empty() {
        0.0
    } else {
        round2(total as f64 / analyzed.len() as f64)
    };

    let mut ranked = analyzed.clone();
    ranked.sort_by(|a, b| b.attendees_count.cmp(&a.attendees_count).then(a.id.cmp(&b.id)));
    let top_attended_events = ranked
        .iter()
        .take(TOP_EVENTS_LIMIT)
        .map(|e| {
            related(json!({
                "id": e.id,
                "title": e.title,
                "start_date": e.start_date,
                "attendees_count": e.attendees_count,
            }))
        })
        .collect();

    let attendance_by_month = month_totals(&analyzed);
    let attendance_trends = trend(&attendance_by_month);

    // naive linear projection from the last two months
    let predictions = {
        let mut recent = attendance_by_month.values().rev();
        match (recent.next(), recent.next()) {
            (Some(last), Some(prev)) => Some(related(json!({
                "next_month_estimate": (last + (last - prev)).max(0),
                "method": "linear",
            }))),
            _ => None,
        }
    };

    AttendanceInsights {
        total_events_analyzed: analyzed.len() as i64,
        average_attendance,
        attendance_by_month,
        top_attended_events,
        attendance_trends,
        predictions,
        generated_at: now,
    }
}

pub fn engagement(members: &[MemberResponse], groups: &[GroupResponse], now: DateTime<Utc>) -> EngagementInsights {
    let active_by_id: HashMap<i64, bool> = members.iter().map(|m| (m.id, is_active(m))).collect();
    let active_members = active_by_id.values().filter(|a| **a).count() as i64;
    let total = members.len() as i64;
    let engagement_score = if total == 0 {
        0.0
    } else {
        round2(active_members as f64 / total as f64 * 100.0)
    };

    let engagement_by_group = groups
        .iter()
        .map(|g| {
            let ids: Vec<i64> = g.members.iter().filter_map(|m| m.get("id")?.as_i64()).collect();
            let active = ids
                .iter()
                .filter(|id| active_by_id.get(*id).copied().unwrap_or(false))
                .count();
            let score = if ids.is_empty() {
                0.0
            } else {
                round2(active as f64 / ids.len() as f64 * 100.0)
            };
            (g.name.clone(), score)
        })
        .collect();

    let member_activity = members
        .iter()
        .map(|m| {
            related(json!({
                "id": m.id,
                "name": m.name,
                "groups": m.groups.len(),
                "tasks_completed": m.tasks_completed,
                "tasks_pending": m.tasks_pending,
                "active": is_active(m),
            }))
        })
        .collect();

    let inactive_members = total - active_members;
    let mut recommendations = Vec::new();
    if inactive_members > 0 {
        recommendations.push(format!(
            "Reach out to {inactive_members} member(s) who have not joined a group or completed a task yet."
        ));
    }
    let pending: i64 = members.iter().map(|m| m.tasks_pending).sum();
    if pending > 0 {
        recommendations.push(format!("Follow up on {pending} pending task(s)."));
    }
    for group in groups.iter().filter(|g| g.members_count == 0) {
        recommendations.push(format!("Recruit members for the {} group.", group.name));
    }
    if recommendations.is_empty() {
        recommendations.push("Engagement looks healthy. Keep the current rhythm.".to_string());
    }

    EngagementInsights {
        total_members_analyzed: total,
        engagement_score,
        active_members,
        inactive_members,
        engagement_by_group,
        member_activity,
        recommendations,
        generated_at: now,
    }
}

pub fn dashboard(
    events: &[EventResponse],
    members: &[MemberResponse],
    groups: &[GroupResponse],
    tasks: &[TaskResponse],
    now: DateTime<Utc>,
) -> DashboardInsights {
    let upcoming_events = events
        .iter()
        .filter(|e| e.start_date > now && e.status != EventStatus::Cancelled)
        .count() as i64;
    let active_tasks = tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Completed)
        .count() as i64;

    let mut recent: Vec<(DateTime<Utc>, Value)> = Vec::new();
    recent.extend(events.iter().map(|e| {
        (e.created_at, json!({"type": "event_created", "id": e.id, "title": e.title, "at": e.created_at}))
    }));
    recent.extend(members.iter().map(|m| {
        (m.created_at, json!({"type": "member_joined", "id": m.id, "name": m.name, "at": m.created_at}))
    }));
    recent.extend(tasks.iter().filter_map(|t| {
        t.completed_at.map(|at| {
            (at, json!({"type": "task_completed", "id": t.id, "title": t.title, "at": at}))
        })
    }));
    recent.sort_by(|a, b| b.0.cmp(&a.0));
    let recent_activity = recent
        .into_iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|(_, v)| related(v))
        .collect();

    let snapshot = attendance(events, now);
    let mut attendance_trend = snapshot.attendance_trends;
    attendance_trend.insert("by_month".to_string(), json!(snapshot.attendance_by_month));

    DashboardInsights {
        total_members: members.len() as i64,
        total_events: events.len() as i64,
        upcoming_events,
        active_tasks,
        recent_activity,
        attendance_trend,
        engagement_score: engagement(members, groups, now).engagement_score,
        generated_at: now,
    }
}
