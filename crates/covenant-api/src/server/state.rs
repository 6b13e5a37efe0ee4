#[derive(Clone)]
struct AppState {
    console: Arc<Mutex<OperatorConsole>>,
}

impl AppState {
    fn new(console: OperatorConsole) -> Self {
        Self {
            console: Arc::new(Mutex::new(console)),
        }
    }
}
