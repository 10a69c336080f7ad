use crate::sync::{Arc, Mutex};

#[test]
fn default_mutex_holds_the_default_value() {
    let shared: Arc<Mutex<Vec<u8>>> = Arc::default();
    assert!(shared.lock().is_empty());

    let other = shared.clone();
    other.lock().push(7);
    assert_eq!(*shared.lock(), vec![7]);
}
