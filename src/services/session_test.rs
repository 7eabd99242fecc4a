use std::sync::Mutex;

use floorplan::doc::{DecimalError, Shape, Table, TableUpdate, parse_decimal};

use super::*;

const PLAN: PlanSize = PlanSize { width: 1000.0, height: 800.0 };

// =============================================================================
// MockStore
// =============================================================================

struct MockStore {
    tables: Mutex<Vec<Table>>,
    updates: Mutex<Vec<(TableId, TableUpdate)>>,
    fail_updates: bool,
    loads: Mutex<usize>,
}

impl MockStore {
    fn new(tables: Vec<Table>) -> Self {
        Self { tables: Mutex::new(tables), updates: Mutex::new(Vec::new()), fail_updates: false, loads: Mutex::new(0) }
    }

    fn failing(tables: Vec<Table>) -> Self {
        Self { fail_updates: true, ..Self::new(tables) }
    }
}

#[async_trait::async_trait]
impl TableStore for MockStore {
    async fn load_tables(&self) -> Result<Vec<Table>, StoreError> {
        *self.loads.lock().unwrap() += 1;
        Ok(self.tables.lock().unwrap().clone())
    }

    async fn update_table(&self, id: TableId, update: &TableUpdate) -> Result<(), StoreError> {
        self.updates.lock().unwrap().push((id, update.clone()));
        if self.fail_updates {
            return Err(StoreError::Status { status: 500, body: "database locked".into() });
        }
        let mut tables = self.tables.lock().unwrap();
        let table = tables.iter_mut().find(|t| t.id == id).ok_or(StoreError::NotFound(id))?;
        apply_update(update, table).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

/// Write the present fields of a merge patch onto a stored record.
fn apply_update(update: &TableUpdate, table: &mut Table) -> Result<(), DecimalError> {
    let fields = [
        ("posX", &update.pos_x, &mut table.pos_x),
        ("posY", &update.pos_y, &mut table.pos_y),
        ("width", &update.width, &mut table.width),
        ("height", &update.height, &mut table.height),
        ("rotation", &update.rotation, &mut table.rotation),
    ];
    for (field, raw, slot) in fields {
        if let Some(raw) = raw {
            *slot = parse_decimal(field, raw)?;
        }
    }
    Ok(())
}

fn make_table(id: TableId, shape: Shape) -> Table {
    Table {
        id,
        numero: Some(id),
        nom: None,
        shape,
        pos_x: 50.0,
        pos_y: 50.0,
        width: 7.76,
        height: 7.76,
        rotation: 0.0,
        nombre_places_max: 6,
        personnes: Vec::new(),
        categorie: None,
    }
}

async fn open(store: &Arc<MockStore>) -> EditSession {
    let dyn_store: Arc<dyn TableStore> = store.clone();
    EditSession::open(dyn_store, EditorConfig::default(), PLAN).await.unwrap()
}

// =============================================================================
// open
// =============================================================================

#[tokio::test]
async fn open_loads_and_measures() {
    let store = Arc::new(MockStore::new(vec![make_table(1, Shape::Circle), make_table(2, Shape::Oval)]));
    let session = open(&store).await;
    assert!(session.provider().is_ready());
    assert_eq!(session.provider().controllers().len(), 2);
    assert_eq!(*store.loads.lock().unwrap(), 1);
}

#[tokio::test]
async fn open_rejects_zero_plan() {
    let store: Arc<dyn TableStore> = Arc::new(MockStore::new(Vec::new()));
    let err = EditSession::open(store, EditorConfig::default(), PlanSize::new(0.0, 0.0)).await.err();
    assert!(matches!(err, Some(SessionError::NotReady { .. })));
}

// =============================================================================
// Gestures
// =============================================================================

#[tokio::test]
async fn drag_persists_two_place_percentages() {
    let store = Arc::new(MockStore::new(vec![make_table(1, Shape::Circle)]));
    let mut session = open(&store).await;

    let report = session.drag(1, Point::new(200.0, 100.0)).await.unwrap();
    assert!(report.persisted());
    assert_eq!(report.indicator, SaveIndicator::Saved);
    assert!((report.committed.pos_x - 20.0).abs() < 1e-9);
    assert!((report.committed.pos_y - 12.5).abs() < 1e-9);

    let updates = store.updates.lock().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].1.pos_x.as_deref(), Some("20.00"));
    assert_eq!(updates[0].1.pos_y.as_deref(), Some("12.50"));
    assert_eq!(updates[0].1.width.as_deref(), Some("7.76"));
}

#[tokio::test]
async fn failed_save_rolls_back() {
    let store = Arc::new(MockStore::failing(vec![make_table(1, Shape::Rectangle)]));
    let mut session = open(&store).await;

    let report = session.drag(1, Point::new(200.0, 100.0)).await.unwrap();
    assert!(!report.persisted());
    assert_eq!(report.saves[0].error, Some(StoreError::Status { status: 500, body: "database locked".into() }));
    assert_eq!(report.indicator, SaveIndicator::Idle);
    assert!((report.committed.pos_x - 50.0).abs() < 1e-9);
    assert!(!session.provider().should_confirm_leave());
}

#[tokio::test]
async fn resize_circle_stays_round() {
    let store = Arc::new(MockStore::new(vec![make_table(1, Shape::Circle)]));
    let mut session = open(&store).await;

    let report = session.resize(1, ResizeAnchor::Se, Point::new(40.0, 10.0)).await.unwrap();
    assert!(report.persisted());
    assert!((report.committed.width - report.committed.height).abs() < f64::EPSILON);
    assert!(report.committed.width > 7.76);
}

#[tokio::test]
async fn rotate_turns_clockwise() {
    let store = Arc::new(MockStore::new(vec![make_table(1, Shape::Rectangle)]));
    let mut session = open(&store).await;

    let report = session.rotate(1, 45.0).await.unwrap();
    assert!((report.committed.rotation - 45.0).abs() < 1e-9);
    let updates = store.updates.lock().unwrap();
    assert_eq!(updates[0].1.rotation.as_deref(), Some("45.00"));
}

#[tokio::test]
async fn unknown_table_is_an_error() {
    let store = Arc::new(MockStore::new(vec![make_table(1, Shape::Rectangle)]));
    let mut session = open(&store).await;
    let err = session.drag(99, Point::new(0.0, 0.0)).await.err();
    assert!(matches!(err, Some(SessionError::UnknownTable(99))));
}

// =============================================================================
// Reload
// =============================================================================

#[tokio::test]
async fn reload_picks_up_new_tables() {
    let store = Arc::new(MockStore::new(vec![make_table(1, Shape::Rectangle)]));
    let mut session = open(&store).await;
    store.tables.lock().unwrap().push(make_table(2, Shape::Oval));

    session.reload().await.unwrap();
    assert_eq!(session.provider().controllers().len(), 2);
    assert_eq!(*store.loads.lock().unwrap(), 2);
}

#[tokio::test]
async fn reload_after_drag_reads_stored_geometry() {
    let store = Arc::new(MockStore::new(vec![make_table(1, Shape::Rectangle)]));
    let mut session = open(&store).await;
    session.drag(1, Point::new(200.0, 100.0)).await.unwrap();

    session.reload().await.unwrap();
    let table = session.provider().controller(1).unwrap().table();
    assert!((table.pos_x - 20.0).abs() < 1e-9);
    assert!((table.pos_y - 12.5).abs() < 1e-9);
    assert!((store.tables.lock().unwrap()[0].pos_x - 20.0).abs() < 1e-9);
}
