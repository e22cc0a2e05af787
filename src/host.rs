//! Observer capabilities a host provides, and the glue that binds them to a
//! [`GridInstance`] for its whole mounted lifetime.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::warn;

use crate::engine::GridInstance;

/// Container size in logical pixels plus the current device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
}

/// A live subscription; `disconnect` must stop further callbacks.
pub trait Observation {
    fn disconnect(&mut self);
}

pub trait ObserverHost {
    /// Current container size, used once at mount.
    fn measure(&self) -> Option<Size>;
    fn observe_resize(&mut self, cb: Box<dyn FnMut(Size)>) -> Option<Box<dyn Observation>>;
    fn observe_visibility(&mut self, cb: Box<dyn FnMut(bool)>) -> Option<Box<dyn Observation>>;
}

/// A grid instance wired to its host's observers.
pub struct Mount {
    instance: Rc<RefCell<dyn GridInstance>>,
    observations: Vec<Box<dyn Observation>>,
    torn_down: bool,
}

fn with_instance(weak: &Weak<RefCell<dyn GridInstance>>, f: impl FnOnce(&mut dyn GridInstance)) {
    let Some(instance) = weak.upgrade() else {
        return;
    };
    match instance.try_borrow_mut() {
        Ok(mut i) => f(&mut *i),
        Err(_) => warn!("flicker grid busy; dropping reentrant observer event"),
    };
}

impl Mount {
    pub fn new(instance: Rc<RefCell<dyn GridInstance>>, host: &mut dyn ObserverHost) -> Self {
        if let Some(size) = host.measure() {
            instance
                .borrow_mut()
                .resize(size.width, size.height, size.dpr);
        }
        let mut observations = Vec::new();

        let weak = Rc::downgrade(&instance);
        match host.observe_resize(Box::new(move |size: Size| {
            with_instance(&weak, |i| i.resize(size.width, size.height, size.dpr));
        })) {
            Some(o) => observations.push(o),
            None => warn!("resize observer unavailable; grid keeps its mount size"),
        }

        let weak = Rc::downgrade(&instance);
        match host.observe_visibility(Box::new(move |visible: bool| {
            with_instance(&weak, |i| i.set_visible(visible));
        })) {
            Some(o) => observations.push(o),
            None => {
                // Without visibility reports, treat the grid as always on screen.
                warn!("visibility observer unavailable; rendering unconditionally");
                instance.borrow_mut().set_visible(true);
            }
        }

        Self {
            instance,
            observations,
            torn_down: false,
        }
    }

    /// Disconnect every observer, then tear the instance down.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        for mut o in self.observations.drain(..) {
            o.disconnect();
        }
        match self.instance.try_borrow_mut() {
            Ok(mut i) => i.teardown(),
            Err(_) => warn!("flicker grid busy during teardown"),
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.teardown();
    }
}
