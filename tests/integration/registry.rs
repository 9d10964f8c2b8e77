//! The process-wide format registry.
//!
//! This is the only test in this binary that touches the shared registry.

use strata_foundation::Value;
use strata_mapper::Collection;
use strata_mapper::format::{clear_shared, reset_shared, shared_converter};

#[test]
fn clearing_and_resetting_shared_formats() {
    let c: Collection<Value> = ["a", "b"].into_iter().map(Value::from).collect();
    assert_eq!(c.to("json"), Some(Value::from(r#"["a","b"]"#)));

    clear_shared();
    assert!(shared_converter("json").is_none());
    assert_eq!(c.to("json"), None);
    assert!(c.to("array").is_some());

    reset_shared();
    assert_eq!(c.to("json"), Some(Value::from(r#"["a","b"]"#)));
}
