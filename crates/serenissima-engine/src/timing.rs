//! The uniform activity time-window policy.
//!
//! Every creator computes its start/end window the same way, in order of
//! precedence:
//!
//! 1. routing data carrying its own start and end -- used verbatim;
//! 2. an explicit start time -- end is start plus the explicit duration,
//!    or the type default when none was given;
//! 3. otherwise -- now plus the type default.
//!
//! Type defaults are scaled by the citizen's social class pace, so a
//! Nobili's fishing trip runs longer than a Facchino's. The result always
//! satisfies `start <= end`.

use chrono::{DateTime, Duration, Utc};

use serenissima_types::{ActivityType, SocialClass};

/// A start/end pair supplied by an external routing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteWindow {
    /// When travel begins.
    pub start: DateTime<Utc>,
    /// When travel ends.
    pub end: DateTime<Utc>,
}

/// Caller-supplied hints for window computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowRequest {
    /// Explicit start time, if the caller schedules ahead.
    pub explicit_start: Option<DateTime<Utc>>,
    /// Explicit duration in minutes, usually from routing data.
    pub explicit_duration_minutes: Option<u32>,
    /// A complete window from the routing service.
    pub route: Option<RouteWindow>,
}

/// Compute the activity window for a type and social class.
///
/// Guarantees `start <= end`: a routing window arriving inverted is
/// squashed to a zero-length window at its start.
pub fn compute_window(
    now: DateTime<Utc>,
    request: WindowRequest,
    activity_type: ActivityType,
    social_class: SocialClass,
) -> (DateTime<Utc>, DateTime<Utc>) {
    if let Some(route) = request.route {
        let end = route.end.max(route.start);
        return (route.start, end);
    }

    let start = request.explicit_start.unwrap_or(now);
    let minutes = request
        .explicit_duration_minutes
        .map_or_else(|| default_minutes(activity_type, social_class), u64::from);
    let end = start + Duration::minutes(i64::try_from(minutes).unwrap_or(i64::MAX));
    (start, end.max(start))
}

/// The class-scaled default duration in minutes.
fn default_minutes(activity_type: ActivityType, social_class: SocialClass) -> u64 {
    let base = u64::from(activity_type.default_duration_minutes());
    let pace = u64::from(social_class.pace_pct());
    base.saturating_mul(pace) / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-08-30T12:00:00Z")
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    #[test]
    fn route_window_wins_verbatim() {
        let route = RouteWindow {
            start: now() + Duration::minutes(10),
            end: now() + Duration::minutes(55),
        };
        let (start, end) = compute_window(
            now(),
            WindowRequest {
                explicit_start: Some(now()),
                explicit_duration_minutes: Some(5),
                route: Some(route),
            },
            ActivityType::GotoLocation,
            SocialClass::Popolani,
        );
        assert_eq!(start, route.start);
        assert_eq!(end, route.end);
    }

    #[test]
    fn explicit_start_plus_explicit_duration() {
        let scheduled = now() + Duration::hours(3);
        let (start, end) = compute_window(
            now(),
            WindowRequest {
                explicit_start: Some(scheduled),
                explicit_duration_minutes: Some(20),
                route: None,
            },
            ActivityType::Fishing,
            SocialClass::Nobili,
        );
        assert_eq!(start, scheduled);
        assert_eq!(end, scheduled + Duration::minutes(20));
    }

    #[test]
    fn explicit_start_falls_back_to_type_default() {
        let scheduled = now() + Duration::hours(1);
        let (start, end) = compute_window(
            now(),
            WindowRequest {
                explicit_start: Some(scheduled),
                explicit_duration_minutes: None,
                route: None,
            },
            ActivityType::GotoLocation,
            SocialClass::Popolani,
        );
        assert_eq!(start, scheduled);
        // 30 minutes base at 100% pace.
        assert_eq!(end, scheduled + Duration::minutes(30));
    }

    #[test]
    fn bare_request_is_now_plus_scaled_default() {
        let (start, end) = compute_window(
            now(),
            WindowRequest::default(),
            ActivityType::Fishing,
            SocialClass::Nobili,
        );
        assert_eq!(start, now());
        // 90 minutes base at 150% pace.
        assert_eq!(end, now() + Duration::minutes(135));
    }

    #[test]
    fn window_is_never_inverted() {
        let route = RouteWindow {
            start: now(),
            end: now() - Duration::minutes(10),
        };
        let (start, end) = compute_window(
            now(),
            WindowRequest {
                explicit_start: None,
                explicit_duration_minutes: None,
                route: Some(route),
            },
            ActivityType::GotoLocation,
            SocialClass::Facchini,
        );
        assert!(start <= end);
    }
}
