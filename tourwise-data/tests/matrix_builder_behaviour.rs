//! Behavioural tests for [`DistanceMatrixBuilder`].
//!
//! These tests use [`StubDistanceService`] to verify chunking and failure
//! handling without a running routing service.

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use std::num::NonZeroUsize;
use tourwise_core::test_support::{matrix, start, stop};
use tourwise_core::{DistanceMatrix, UNREACHABLE, Waypoint};
use tourwise_data::routing::DistanceServiceError;
use tourwise_data::routing::test_support::{RecordedRequest, StubDistanceService};
use tourwise_data::{BuiltMatrix, DistanceMatrixBuilder, MatrixBuildError, MatrixBuilderConfig};

/// Waypoints plus the stub that will answer for them.
type Setup = RefCell<Option<(Vec<Waypoint>, StubDistanceService)>>;

/// What a build produced and what the service saw.
struct Outcome {
    built: Result<BuiltMatrix, MatrixBuildError>,
    requests: Vec<RecordedRequest>,
}

type OutcomeCell = RefCell<Option<Outcome>>;

#[fixture]
fn setup() -> Setup {
    RefCell::new(None)
}

#[fixture]
fn cap() -> RefCell<usize> {
    RefCell::new(25)
}

#[fixture]
fn outcome() -> OutcomeCell {
    RefCell::new(None)
}

fn four_stops() -> Vec<Waypoint> {
    vec![
        start("a", -0.10, 51.50),
        stop("b", -0.11, 51.51),
        stop("c", -0.12, 51.52),
        stop("d", -0.13, 51.53),
    ]
}

fn known_distances() -> DistanceMatrix {
    matrix(vec![
        vec![0, 120, 340, 560],
        vec![130, 0, 210, 430],
        vec![350, 220, 0, 190],
        vec![570, 440, 200, 0],
    ])
}

// --- Given steps ---

#[given("four waypoints with known distances")]
fn known_waypoints(#[from(setup)] setup: &Setup) {
    let stops = four_stops();
    let service = StubDistanceService::new(&stops, known_distances());
    *setup.borrow_mut() = Some((stops, service));
}

#[given("four waypoints whose last destination chunk always fails")]
fn failing_chunk(#[from(setup)] setup: &Setup) {
    let stops = four_stops();
    let service = StubDistanceService::new(&stops, known_distances()).failing_destination(3);
    *setup.borrow_mut() = Some((stops, service));
}

#[given("four waypoints and an unavailable distance service")]
fn unavailable_service(#[from(setup)] setup: &Setup) {
    let stops = four_stops();
    let service = StubDistanceService::new(&stops, known_distances()).with_error(
        DistanceServiceError::Timeout {
            url: "http://example.com/table/v1/driving".to_owned(),
            timeout_secs: 30,
        },
    );
    *setup.borrow_mut() = Some((stops, service));
}

#[given("a destination cap of two")]
fn cap_of_two(#[from(cap)] cap: &RefCell<usize>) {
    *cap.borrow_mut() = 2;
}

#[given("a destination cap of three")]
fn cap_of_three(#[from(cap)] cap: &RefCell<usize>) {
    *cap.borrow_mut() = 3;
}

// --- When steps ---

#[when("I build the distance matrix")]
fn build_matrix(
    #[from(setup)] setup: &Setup,
    #[from(cap)] cap: &RefCell<usize>,
    #[from(outcome)] outcome: &OutcomeCell,
) {
    let (stops, service) = setup.borrow_mut().take().expect("setup must be initialised");
    let k = NonZeroUsize::new(*cap.borrow()).expect("cap must be positive");
    let config = MatrixBuilderConfig::default().with_max_destinations_per_request(k);
    let builder = DistanceMatrixBuilder::with_config(service, config);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime should build");

    let built = runtime.block_on(builder.build(&stops));
    *outcome.borrow_mut() = Some(Outcome {
        built,
        requests: builder.service().requests(),
    });
}

// --- Then steps ---

#[then("eight requests are issued")]
fn eight_requests(#[from(outcome)] outcome: &OutcomeCell) {
    let borrowed = outcome.borrow();
    let run = borrowed.as_ref().expect("build must have run");
    assert_eq!(run.requests.len(), 8);
    let built = run.built.as_ref().expect("expected Ok result");
    assert_eq!(built.report.requests, 8);
}

#[then("the matrix matches the known distances")]
fn matches_known(#[from(outcome)] outcome: &OutcomeCell) {
    let borrowed = outcome.borrow();
    let built = borrowed
        .as_ref()
        .and_then(|run| run.built.as_ref().ok())
        .expect("expected Ok result");
    assert_eq!(built.matrix, known_distances());
    assert!(!built.report.is_degraded());
}

#[then("no request exceeds three destinations")]
fn within_cap(#[from(outcome)] outcome: &OutcomeCell) {
    let borrowed = outcome.borrow();
    let run = borrowed.as_ref().expect("build must have run");
    assert!(
        run.requests
            .iter()
            .all(|request| request.destinations.len() <= 3),
        "requests: {:?}",
        run.requests
    );
}

#[then("the build succeeds")]
fn build_succeeds(#[from(outcome)] outcome: &OutcomeCell) {
    let borrowed = outcome.borrow();
    let run = borrowed.as_ref().expect("build must have run");
    assert!(run.built.is_ok(), "got {:?}", run.built);
}

#[then("every cell in the failed chunk is unreachable")]
fn failed_chunk_unreachable(#[from(outcome)] outcome: &OutcomeCell) {
    let borrowed = outcome.borrow();
    let built = borrowed
        .as_ref()
        .and_then(|run| run.built.as_ref().ok())
        .expect("expected Ok result");
    let known = known_distances();
    for origin in 0..4 {
        for column in 0..4 {
            let expected = if column >= 2 {
                Some(UNREACHABLE)
            } else {
                known.get(origin, column)
            };
            assert_eq!(built.matrix.get(origin, column), expected, "cell ({origin}, {column})");
        }
    }
    assert_eq!(built.report.failed_requests, 4);
}

#[then("every cell is unreachable")]
fn all_unreachable(#[from(outcome)] outcome: &OutcomeCell) {
    let borrowed = outcome.borrow();
    let built = borrowed
        .as_ref()
        .and_then(|run| run.built.as_ref().ok())
        .expect("expected Ok result");
    assert_eq!(built.matrix, DistanceMatrix::unreachable(4));
    assert_eq!(built.report.unreachable_cells, 12);
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/matrix_builder.feature", name = $title)]
        fn $fn_name(setup: Setup, cap: RefCell<usize>, outcome: OutcomeCell) {
            let _ = (setup, cap, outcome);
        }
    };
}

register_scenario!(fetching_in_chunks_of_two, "fetching four waypoints in chunks of two");
register_scenario!(respecting_destination_cap, "respecting the destination cap");
register_scenario!(absorbing_failed_chunk, "absorbing a failed chunk");
register_scenario!(surviving_service_outage, "surviving a service outage");
