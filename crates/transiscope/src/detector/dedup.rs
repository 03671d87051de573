use super::Event;

/// Greedy suppression of re-triggers across detectors for one ROI.
///
/// Events are stably sorted by `start_time` (ties keep input order, i.e.
/// detector order). An event is kept when it starts at least `min_separation`
/// seconds after the last kept event; the rest are dropped, not merged.
pub fn dedup_events(events: Vec<Event>, min_separation: f64) -> Vec<Event> {
    let min_separation = if min_separation.is_finite() {
        min_separation.max(0.0)
    } else {
        0.0
    };
    let mut events = events;
    events.sort_by(|a, b| a.start_time().total_cmp(&b.start_time()));

    let mut kept: Vec<Event> = Vec::with_capacity(events.len());
    for event in events {
        let accept = kept
            .last()
            .map_or(true, |last| event.start_time() - last.start_time() >= min_separation);
        if accept {
            kept.push(event);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::EventKind;

    fn at(t: f64, kind: EventKind) -> Event {
        Event::new(1, kind, t, t)
    }

    #[test]
    fn drops_events_inside_separation_window() {
        let events = vec![
            at(0.9, EventKind::DoG),
            at(0.0, EventKind::Threshold),
            at(0.2, EventKind::DoG),
        ];
        let kept = dedup_events(events, 0.5);
        let times: Vec<f64> = kept.iter().map(|e| e.start_time()).collect();
        assert_eq!(times, vec![0.0, 0.9]);
    }

    #[test]
    fn window_is_measured_from_last_kept_event() {
        // 0.4 is dropped, so 0.8 is compared against 0.0 and kept.
        let kept = dedup_events(
            vec![
                at(0.0, EventKind::DoG),
                at(0.4, EventKind::DoG),
                at(0.8, EventKind::DoG),
            ],
            0.5,
        );
        let times: Vec<f64> = kept.iter().map(|e| e.start_time()).collect();
        assert_eq!(times, vec![0.0, 0.8]);
    }

    #[test]
    fn ties_keep_detector_order() {
        let kept = dedup_events(
            vec![at(1.0, EventKind::Threshold), at(1.0, EventKind::DoG)],
            0.5,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].event_type(), EventKind::Threshold);
    }

    #[test]
    fn zero_separation_keeps_everything() {
        let events = vec![at(1.0, EventKind::Threshold), at(1.0, EventKind::DoG)];
        assert_eq!(dedup_events(events, 0.0).len(), 2);
        assert!(dedup_events(Vec::new(), 0.5).is_empty());
    }
}
