use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use catalog::{EventType, FilterState, HistoricalEvent, WarPeriod};
use chrono::NaiveDate;
use explorer::{ApplyOutcome, ControllerConfig, ControllerEvent, InteractionController};
use foundation::math::{CameraPose, geo_to_sphere};
use foundation::time::Time;
use foundation::{DateRange, GeoCoordinate, Viewport};
use pretty_assertions::assert_eq;
use streaming::{
    AnnotatedCluster, BoxFuture, ClientError, Cluster, ClusterSource, DEFAULT_RADIUS_SCALE,
};

const DISTANCE: f64 = 2.0;

fn event(id: &str, lat: f64, lon: f64) -> HistoricalEvent {
    HistoricalEvent {
        id: id.to_string(),
        title: format!("event {id}"),
        description: String::new(),
        date: NaiveDate::from_ymd_opt(1916, 7, 1).expect("date"),
        location: GeoCoordinate::new(lat, lon),
        event_type: EventType::Battles,
        period: WarPeriod::Wwi,
        tags: vec!["wwi".into(), "battles".into()],
        image_url: None,
    }
}

fn annotated(id: &str, events: Vec<HistoricalEvent>, viewport: &Viewport) -> AnnotatedCluster {
    let cluster = Cluster {
        id: id.to_string(),
        parent_id: None,
        centroid: events[0].location,
        centroid_time_days: 0.0,
        level: 1,
        event_ids: events.iter().map(|e| e.id.clone()).collect(),
        bounds: None,
        date_range: DateRange::default(),
        events,
    };
    let geometry = cluster.geometry(viewport, DEFAULT_RADIUS_SCALE);
    AnnotatedCluster { cluster, geometry }
}

/// Answers `[a, b]` with no period filter and `[b, c]` with one.
#[derive(Default)]
struct CountingSource {
    calls: AtomicUsize,
    fail: AtomicBool,
    seen: Mutex<Vec<FilterState>>,
}

impl CountingSource {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ClusterSource for CountingSource {
    fn fetch(
        &self,
        filter: &FilterState,
    ) -> BoxFuture<'_, Result<Vec<AnnotatedCluster>, ClientError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(filter.clone());
        }
        let result = if self.fail.load(Ordering::SeqCst) {
            Err(ClientError::Malformed {
                endpoint: "fake/clusters/hierarchical".into(),
                reason: "response is missing `data`".into(),
            })
        } else {
            let events = match filter.period {
                None => vec![event("a", 48.0, 2.0), event("b", 50.0, 3.0)],
                Some(_) => vec![event("b", 50.0, 3.0), event("c", 52.0, 13.0)],
            };
            Ok(vec![annotated("c1", events, &filter.viewport)])
        };
        Box::pin(async move { result })
    }

    fn events_at(
        &self,
        lat: f64,
        lon: f64,
        _date: NaiveDate,
    ) -> BoxFuture<'_, Result<Vec<HistoricalEvent>, ClientError>> {
        Box::pin(async move { Ok(vec![event("p", lat, lon)]) })
    }
}

fn initial_viewport() -> Viewport {
    Viewport::new(80.0, 20.0, 60.0, -40.0)
}

fn controller() -> InteractionController {
    InteractionController::new(
        ControllerConfig::default(),
        FilterState::new(initial_viewport()),
    )
}

/// Pose whose estimated viewport is the initial one shifted by `dlon`.
/// At lon 10 the frustum spans 30° north/south and 50° east/west.
fn pose_at(dlon: f64) -> CameraPose {
    CameraPose {
        position: geo_to_sphere(50.0, 10.0 + dlon, DISTANCE),
        fov_y_deg: 2.0 * (30f64.to_radians() / DISTANCE).atan().to_degrees(),
        aspect: 50.0 / 30.0,
    }
}

async fn run_initial(c: &mut InteractionController, source: &CountingSource) {
    let q = c.initial_query().expect("initial query");
    let (seq, result) = q.run(source).await;
    assert_eq!(c.apply(seq, result), ApplyOutcome::Applied { events: 2 });
}

#[tokio::test]
async fn initial_filter_issues_one_fetch() {
    let source = CountingSource::default();
    let mut c = controller();
    run_initial(&mut c, &source).await;

    assert_eq!(source.calls(), 1);
    let seen = source.seen.lock().expect("lock");
    assert_eq!(seen[0].viewport, initial_viewport());
    assert_eq!(seen[0].period, None);
    assert!(seen[0].types.is_empty());
    assert_eq!(c.scene().len(), 2);
}

#[tokio::test]
async fn small_drags_are_gated_and_a_large_one_fetches_once() {
    let source = CountingSource::default();
    let mut c = controller();
    run_initial(&mut c, &source).await;

    let mut now = Time(0.0);
    for dlon in [1.0, 2.5, 4.0, 3.0] {
        now = Time(now.0 + 0.1);
        c.on_camera_change(pose_at(dlon), now);
    }
    now = Time(now.0 + 0.5);
    assert!(c.tick(now).is_none());
    assert_eq!(source.calls(), 1);

    c.on_camera_change(pose_at(7.0), Time(now.0 + 0.1));
    assert!(c.tick(Time(now.0 + 0.2)).is_none(), "still debouncing");
    let q = c.tick(Time(now.0 + 0.5)).expect("significant drag");
    let (seq, result) = q.run(&source).await;
    assert!(matches!(c.apply(seq, result), ApplyOutcome::Applied { .. }));
    assert_eq!(source.calls(), 2);
    assert!((c.filter().viewport.east - 67.0).abs() < 1e-6);
    assert!(
        c.drain_events()
            .iter()
            .any(|e| matches!(e, ControllerEvent::ViewportChanged(_)))
    );
}

#[tokio::test]
async fn out_of_order_responses_keep_the_newest() {
    let source = CountingSource::default();
    let mut c = controller();
    run_initial(&mut c, &source).await;

    let older = c.set_period(Some(WarPeriod::Wwi)).expect("query");
    let newer = c.set_period(Some(WarPeriod::Wwii)).expect("query");

    let (seq_new, res_new) = newer.run(&source).await;
    assert_eq!(c.apply(seq_new, res_new), ApplyOutcome::Applied { events: 2 });
    let (seq_old, res_old) = older.run(&source).await;
    assert_eq!(c.apply(seq_old, res_old), ApplyOutcome::Stale);

    let ids: Vec<&str> = c.events().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c"]);
    assert_eq!(c.filter().period, Some(WarPeriod::Wwii));
}

#[tokio::test]
async fn failed_fetch_keeps_previous_events() {
    let source = CountingSource::default();
    let mut c = controller();
    run_initial(&mut c, &source).await;
    c.drain_events();

    source.fail.store(true, Ordering::SeqCst);
    let q = c.set_year(Some(1916)).expect("query");
    let (seq, result) = q.run(&source).await;
    assert_eq!(c.apply(seq, result), ApplyOutcome::Failed);

    assert_eq!(c.events().len(), 2);
    assert_eq!(c.scene().len(), 2);
    assert!(c.last_error().is_some());
    assert!(
        c.drain_events()
            .iter()
            .any(|e| matches!(e, ControllerEvent::FetchFailed { .. }))
    );
}

#[tokio::test]
async fn failed_newest_request_fences_out_older_ones() {
    let source = CountingSource::default();
    let mut c = controller();
    run_initial(&mut c, &source).await;

    let older = c.set_period(Some(WarPeriod::Wwi)).expect("query");
    let newer = c.set_period(Some(WarPeriod::Wwii)).expect("query");

    source.fail.store(true, Ordering::SeqCst);
    let (seq_new, res_new) = newer.run(&source).await;
    assert_eq!(c.apply(seq_new, res_new), ApplyOutcome::Failed);

    source.fail.store(false, Ordering::SeqCst);
    let (seq_old, res_old) = older.run(&source).await;
    assert_eq!(c.apply(seq_old, res_old), ApplyOutcome::Stale);

    let ids: Vec<&str> = c.events().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(c.filter().period, Some(WarPeriod::Wwii));
    assert!(c.last_error().is_some());
}

#[tokio::test]
async fn results_after_teardown_are_ignored() {
    let source = CountingSource::default();
    let mut c = controller();
    let q = c.initial_query().expect("query");

    c.on_camera_change(pose_at(20.0), Time(0.1));
    c.teardown();
    assert!(!c.has_pending_viewport());

    let (seq, result) = q.run(&source).await;
    assert_eq!(c.apply(seq, result), ApplyOutcome::Unmounted);
    assert!(c.events().is_empty());
    assert!(c.tick(Time(5.0)).is_none());
}

#[tokio::test]
async fn cached_filter_skips_the_network() {
    let source = CountingSource::default();
    let mut c = controller();
    run_initial(&mut c, &source).await;

    let q = c.set_period(Some(WarPeriod::Wwii)).expect("query");
    let (seq, result) = q.run(&source).await;
    c.apply(seq, result);
    assert_eq!(source.calls(), 2);

    assert!(c.set_period(None).is_none(), "served from cache");
    assert_eq!(source.calls(), 2);
    assert_eq!(c.cache_stats().hits, 1);
    let ids: Vec<&str> = c.events().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn selection_follows_the_event_list() {
    let source = CountingSource::default();
    let mut c = controller();
    run_initial(&mut c, &source).await;

    assert!(c.select_event("b"));
    let q = c.set_period(Some(WarPeriod::Wwi)).expect("query");
    let (seq, result) = q.run(&source).await;
    c.apply(seq, result);
    assert_eq!(c.selected_event().map(|e| e.id.as_str()), Some("b"));

    assert!(c.select_event("c"));
    c.drain_events();
    assert!(c.set_period(None).is_none(), "served from cache");
    assert!(c.selected_event().is_none());
    assert!(
        c.drain_events()
            .contains(&ControllerEvent::SelectionCleared)
    );
}

#[tokio::test]
async fn point_lookup_is_narrowed_by_the_filter() {
    let source = CountingSource::default();
    let c = InteractionController::new(
        ControllerConfig::default(),
        FilterState::new(Viewport::world()).with_period(Some(WarPeriod::Wwii)),
    );
    let date = NaiveDate::from_ymd_opt(1916, 7, 1).expect("date");
    let found = source.events_at(50.0, 2.7, date).await.expect("lookup");
    assert_eq!(found.len(), 1);
    assert!(c.admit_lookup(found).is_empty());
}

#[tokio::test]
async fn clicking_a_marker_raises_its_event() {
    let source = CountingSource::default();
    let mut c = controller();
    run_initial(&mut c, &source).await;
    c.drain_events();

    let camera = scene::PerspectiveCamera::orbiting(50.0, 3.0, 2.5, 1.0);
    let ray = camera.ray_through_ndc(0.0, 0.0).expect("center ray");
    let hover = c.pointer_move(ray);
    assert!(hover.changed());

    let picked = c.click(ray).expect("marker under the cursor");
    assert_eq!(picked.id, "b");
    assert_eq!(
        c.drain_events(),
        vec![ControllerEvent::EventSelected(picked.clone())]
    );

    let away = camera.ray_through_ndc(0.9, 0.9).expect("corner ray");
    assert!(c.click(away).is_none());
    assert_eq!(c.selected_event().map(|e| e.id.as_str()), Some("b"));
    assert_eq!(c.clear_selection().as_deref(), Some("b"));
    assert_eq!(c.pointer_leave().current, None);
}
