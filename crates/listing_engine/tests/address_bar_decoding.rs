use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use listing_core::{ChannelDomain, ChannelFiltersPatch, ParamBag, Sorting};
use listing_engine::{
    FilterReconciler, FilterStore, MemoryNavigation, NavigateOptions, NavigationController,
};
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Counts warnings; installed as the only logger of this test binary.
struct WarningCounter {
    warnings: AtomicUsize,
}

impl Log for WarningCounter {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if record.level() == Level::Warn {
            self.warnings.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn flush(&self) {}
}

static COUNTER: WarningCounter = WarningCounter {
    warnings: AtomicUsize::new(0),
};

fn warnings() -> usize {
    COUNTER.warnings.load(Ordering::SeqCst)
}

#[test]
fn malformed_values_are_reported_once_per_navigation() {
    log::set_logger(&COUNTER).expect("no other logger in this binary");
    log::set_max_level(LevelFilter::Trace);

    let store = Arc::new(FilterStore::in_memory());
    let navigation = Arc::new(MemoryNavigation::from_query("sorting=cheapest"));
    let reconciler = FilterReconciler::<ChannelDomain>::mount(store, navigation.clone());
    assert_eq!(warnings(), 1);

    for _ in 0..3 {
        assert_eq!(reconciler.current_filters().sorting, Sorting::DateNewToOld);
        let _ = reconciler.api_filters();
    }
    assert_eq!(warnings(), 1);

    reconciler.handle_filter_change(ChannelFiltersPatch {
        max_quantity: Some(Some(4)),
        ..ChannelFiltersPatch::default()
    });
    assert_eq!(navigation.current_query(), "maxQuantity=4");
    assert_eq!(reconciler.current_filters().max_quantity, Some(4));
    assert_eq!(warnings(), 1);

    navigation.navigate(
        ParamBag::parse_query_string("minPrice=abc"),
        NavigateOptions { replace: false },
    );
    assert_eq!(reconciler.current_filters().min_price, None);
    assert_eq!(reconciler.current_filters().min_price, None);
    assert_eq!(warnings(), 2);
}
