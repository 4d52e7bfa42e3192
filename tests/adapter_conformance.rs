use gatekeeper_lib::{InstrumentedAdapter, MemoryAdapter};

mod memory {
    use super::*;

    gatekeeper_lib::adapter_conformance_tests!(MemoryAdapter::new());
}

mod instrumented_memory {
    use super::*;

    gatekeeper_lib::adapter_conformance_tests!(InstrumentedAdapter::new(MemoryAdapter::new()));
}

#[cfg(feature = "sled")]
mod sled_store {
    use gatekeeper_lib::SledAdapter;

    gatekeeper_lib::adapter_conformance_tests!(
        SledAdapter::temporary().expect("temporary sled db")
    );
}

#[cfg(feature = "sled")]
mod shared_arc {
    use std::sync::Arc;

    use gatekeeper_lib::{Adapter, SledAdapter};

    gatekeeper_lib::adapter_conformance_tests!({
        let adapter: Arc<dyn Adapter> =
            Arc::new(SledAdapter::temporary().expect("temporary sled db"));
        adapter
    });
}
