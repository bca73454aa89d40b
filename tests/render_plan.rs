//! Composition tests driven by a recording backend: which transform gets
//! invoked for which field text, and how rows accumulate into the plan.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::rc::Rc;

use regex::Regex;

use genplot::{
    build_render_plan, AxisSide, FieldExpr, LineKind, OutputSource, PlotMode, PlotRecord,
    RenderItem, RowTable, SessionSet, SourceEntry, SourceError, SourceFactory,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Data {
        field: String,
        mode: PlotMode,
        position: f64,
    },
    Coherence {
        field: String,
        position: f64,
        order: u8,
    },
    Convolution {
        field: String,
        position: f64,
    },
    Wigner {
        field: String,
        position: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Behavior {
    Curve,
    NoData,
    Fail,
    Image,
}

struct RecordingSource {
    calls: Rc<RefCell<Vec<Call>>>,
    behaviors: HashMap<String, Behavior>,
}

impl RecordingSource {
    fn respond(&self, field: &str) -> Result<Option<PlotRecord>, SourceError> {
        match self.behaviors.get(field).copied().unwrap_or(Behavior::Curve) {
            Behavior::Curve => Ok(Some(PlotRecord::curve(
                format!("{field} axis"),
                vec![0.0, 1.0, 2.0],
                vec![1.0, 2.0, 3.0],
                LineKind::Default,
            ))),
            Behavior::NoData => Ok(None),
            Behavior::Fail => Err(SourceError::Read {
                field: field.to_string(),
                reason: "simulated backend failure".to_string(),
            }),
            Behavior::Image => Ok(Some(PlotRecord::image(
                format!("{field} axis"),
                vec![0.0, 1.0, 2.0],
                vec![10.0, 20.0],
                vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]],
            ))),
        }
    }
}

impl OutputSource for RecordingSource {
    fn reload(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    fn find_records(&self, _pattern: &Regex) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn entries(&self, _group: &str) -> Vec<SourceEntry> {
        Vec::new()
    }

    fn get_data(
        &self,
        field: &str,
        mode: PlotMode,
        position: f64,
    ) -> Result<Option<PlotRecord>, SourceError> {
        self.calls.borrow_mut().push(Call::Data {
            field: field.to_string(),
            mode,
            position,
        });
        self.respond(field)
    }

    fn get_coherence(
        &self,
        field: &str,
        position: f64,
        order: u8,
    ) -> Result<Option<PlotRecord>, SourceError> {
        self.calls.borrow_mut().push(Call::Coherence {
            field: field.to_string(),
            position,
            order,
        });
        self.respond(field)
    }

    fn get_convolution(
        &self,
        field: &str,
        position: f64,
    ) -> Result<Option<PlotRecord>, SourceError> {
        self.calls.borrow_mut().push(Call::Convolution {
            field: field.to_string(),
            position,
        });
        self.respond(field)
    }

    fn get_wigner(&self, field: &str, position: f64) -> Result<Option<PlotRecord>, SourceError> {
        self.calls.borrow_mut().push(Call::Wigner {
            field: field.to_string(),
            position,
        });
        self.respond(field)
    }
}

struct RecorderFactory {
    calls: Rc<RefCell<Vec<Call>>>,
    behaviors: HashMap<String, Behavior>,
}

impl SourceFactory for RecorderFactory {
    fn load(&self, _path: &Path) -> Result<Box<dyn OutputSource>, SourceError> {
        Ok(Box::new(RecordingSource {
            calls: self.calls.clone(),
            behaviors: self.behaviors.clone(),
        }))
    }
}

const FILE: &str = "run.h5";

fn setup(behaviors: &[(&str, Behavior)]) -> (SessionSet, Rc<RefCell<Vec<Call>>>) {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let factory = RecorderFactory {
        calls: calls.clone(),
        behaviors: behaviors
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect(),
    };
    let mut sessions = SessionSet::new();
    sessions
        .open(Path::new(FILE), &factory)
        .expect("recorder factory never fails");
    (sessions, calls)
}

fn raw(path: &str) -> FieldExpr {
    FieldExpr::Raw(path.to_string())
}

#[test]
fn raw_rows_dispatch_with_shared_position() {
    let (sessions, calls) = setup(&[]);
    let mut rows = RowTable::new();
    rows.add(FILE, raw("run/Field/power"));
    rows.add(FILE, raw("run/Beam/energy"));
    rows.get_mut(1).unwrap().mode = PlotMode::Max;

    let plan = build_render_plan(&sessions, &rows, 0.25).unwrap();
    assert_eq!(plan.items.len(), 2);
    assert_eq!(
        *calls.borrow(),
        vec![
            Call::Data {
                field: "run/Field/power".to_string(),
                mode: PlotMode::Profile,
                position: 0.25,
            },
            Call::Data {
                field: "run/Beam/energy".to_string(),
                mode: PlotMode::Max,
                position: 0.25,
            },
        ],
        "every row sees the same position in one pass"
    );
}

#[test]
fn correlation_orders_route_distinctly() {
    let (sessions, calls) = setup(&[]);
    let mut rows = RowTable::new();
    rows.add(
        FILE,
        FieldExpr::parse("Correlation1(run/intensity)").unwrap(),
    );
    rows.add(
        FILE,
        FieldExpr::parse("Correlation2(run/intensity)").unwrap(),
    );

    build_render_plan(&sessions, &rows, 0.0).unwrap();
    assert_eq!(
        *calls.borrow(),
        vec![
            Call::Coherence {
                field: "run/intensity".to_string(),
                position: 0.0,
                order: 1,
            },
            Call::Coherence {
                field: "run/intensity".to_string(),
                position: 0.0,
                order: 2,
            },
        ]
    );
}

#[test]
fn convolution_dispatches_inner_field() {
    let (sessions, calls) = setup(&[]);
    let mut rows = RowTable::new();
    rows.add(FILE, FieldExpr::parse("Convolution(run/power)").unwrap());

    build_render_plan(&sessions, &rows, 0.5).unwrap();
    assert_eq!(
        *calls.borrow(),
        vec![Call::Convolution {
            field: "run/power".to_string(),
            position: 0.5,
        }]
    );
}

#[test]
fn wigner_receives_wrapped_text_unmodified() {
    let (sessions, calls) = setup(&[]);
    let mut rows = RowTable::new();
    rows.add(FILE, FieldExpr::parse("Wigner(run/intensity)").unwrap());

    build_render_plan(&sessions, &rows, 0.5).unwrap();
    assert_eq!(
        *calls.borrow(),
        vec![Call::Wigner {
            field: "Wigner(run/intensity)".to_string(),
            position: 0.5,
        }]
    );
}

#[test]
fn disabled_rows_are_not_resolved() {
    let (sessions, calls) = setup(&[]);
    let mut rows = RowTable::new();
    rows.add(FILE, raw("a"));
    rows.add(FILE, raw("b"));
    rows.toggle_enabled(0);

    let plan = build_render_plan(&sessions, &rows, 0.0).unwrap();
    assert_eq!(plan.items.len(), 1);
    assert_eq!(rows.len(), 2, "disabling does not remove the row");
    assert_eq!(
        *calls.borrow(),
        vec![Call::Data {
            field: "b".to_string(),
            mode: PlotMode::Profile,
            position: 0.0,
        }],
        "disabled rows never reach the backend"
    );
}

#[test]
fn missing_data_skips_row_silently() {
    let (sessions, _calls) = setup(&[("gone", Behavior::NoData)]);
    let mut rows = RowTable::new();
    rows.add(FILE, raw("gone"));
    rows.add(FILE, raw("present"));

    let plan = build_render_plan(&sessions, &rows, 0.0).unwrap();
    assert_eq!(plan.items.len(), 1, "no placeholder for missing data");
    assert_eq!(
        plan.xlabel.as_deref(),
        Some("present axis"),
        "skipped rows do not contribute the x label"
    );
}

#[test]
fn xlabel_of_first_resolved_row_wins() {
    let (sessions, _calls) = setup(&[]);
    let mut rows = RowTable::new();
    rows.add(FILE, raw("first"));
    rows.add(FILE, raw("second"));

    let plan = build_render_plan(&sessions, &rows, 0.0).unwrap();
    assert_eq!(plan.xlabel.as_deref(), Some("first axis"));
}

#[test]
fn right_axis_visibility_follows_rows() {
    let (sessions, _calls) = setup(&[]);
    let mut rows = RowTable::new();
    rows.add(FILE, raw("a"));
    rows.add(FILE, raw("b"));

    let plan = build_render_plan(&sessions, &rows, 0.0).unwrap();
    assert!(!plan.has_right_axis, "no row requested the right axis");

    rows.toggle_right_axis(1);
    let plan = build_render_plan(&sessions, &rows, 0.0).unwrap();
    assert!(plan.has_right_axis);
    let axes: Vec<AxisSide> = plan.lines().map(|l| l.axis).collect();
    assert_eq!(axes, vec![AxisSide::Primary, AxisSide::Secondary]);
}

#[test]
fn log_scale_is_axis_scoped() {
    let (sessions, _calls) = setup(&[]);
    let mut rows = RowTable::new();
    rows.add(FILE, raw("a"));
    rows.add(FILE, raw("b"));
    rows.toggle_log(0);

    let plan = build_render_plan(&sessions, &rows, 0.0).unwrap();
    assert!(
        plan.log_primary,
        "one logged row log-scales the shared axis"
    );
    assert!(!plan.log_secondary);
    assert_eq!(plan.lines().count(), 2, "both curves share the logged axis");

    // A logged row on the right axis scales only that axis.
    let mut rows = RowTable::new();
    rows.add(FILE, raw("a"));
    rows.add(FILE, raw("b"));
    rows.toggle_right_axis(1);
    rows.toggle_log(1);
    let plan = build_render_plan(&sessions, &rows, 0.0).unwrap();
    assert!(!plan.log_primary);
    assert!(plan.log_secondary);
}

#[test]
fn images_draw_on_primary_and_ignore_row_flags() {
    let (sessions, _calls) = setup(&[("map", Behavior::Image)]);
    let mut rows = RowTable::new();
    rows.add(FILE, raw("map"));
    rows.toggle_right_axis(0);
    rows.toggle_log(0);

    let plan = build_render_plan(&sessions, &rows, 0.0).unwrap();
    assert!(
        !plan.has_right_axis,
        "image rows never activate the right axis"
    );
    assert!(!plan.log_primary, "image rows never log-scale an axis");

    let images: Vec<_> = plan.images().collect();
    assert_eq!(images.len(), 1);
    let image = images[0];
    assert_eq!(
        image.extent,
        [10.0, 20.0, 0.0, 2.0],
        "horizontal span from the y vector, vertical from x"
    );
    assert_eq!(
        image.rows,
        vec![vec![5.0, 6.0], vec![3.0, 4.0], vec![1.0, 2.0]],
        "scanlines are stored top first"
    );
}

#[test]
fn backend_failure_aborts_the_pass() {
    let (sessions, _calls) = setup(&[("broken", Behavior::Fail)]);
    let mut rows = RowTable::new();
    rows.add(FILE, raw("fine"));
    rows.add(FILE, raw("broken"));

    let result = build_render_plan(&sessions, &rows, 0.0);
    assert!(result.is_err(), "real backend errors are not swallowed");
}

#[test]
fn closed_file_rows_become_no_data() {
    let (mut sessions, calls) = setup(&[]);
    let mut rows = RowTable::new();
    rows.add(FILE, raw("a"));
    rows.add("never-opened.h5", raw("b"));

    assert!(sessions.close(FILE));
    let plan = build_render_plan(&sessions, &rows, 0.0).unwrap();
    assert!(plan.items.is_empty(), "orphaned rows are skipped");
    assert!(
        calls.borrow().is_empty(),
        "orphaned rows never reach a backend"
    );
    assert_eq!(rows.len(), 2, "orphaned rows stay in the table");
}

#[test]
fn line_items_carry_row_color_and_order() {
    let (sessions, _calls) = setup(&[]);
    let mut rows = RowTable::new();
    rows.add(FILE, raw("a"));
    rows.add(FILE, raw("b"));
    rows.get_mut(1).unwrap().color = 4;

    let plan = build_render_plan(&sessions, &rows, 0.0).unwrap();
    let lines: Vec<_> = plan.lines().collect();
    assert_eq!(lines[0].color, 0);
    assert_eq!(lines[1].color, 4);
    assert_eq!(lines[0].label, "a");
    assert_eq!(lines[1].label, "b");
    match &plan.items[0] {
        RenderItem::Line(line) => assert_eq!(line.points, vec![[0.0, 1.0], [1.0, 2.0], [2.0, 3.0]]),
        RenderItem::Image(_) => panic!("expected a line item"),
    }
}
