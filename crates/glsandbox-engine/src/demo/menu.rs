use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::gl::GlContext;

use super::{Demo, DemoUi};

/// Builds a fresh demo on the given context.
pub type DemoFactory = Box<dyn Fn(&Rc<GlContext>) -> Result<Box<dyn Demo>>>;

/// Ordered registry of demos, shown as one button each.
#[derive(Default)]
pub struct DemoMenu {
    entries: Vec<(String, DemoFactory)>,
}

impl DemoMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a demo. Registration order is button order.
    pub fn register<D, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        D: Demo + 'static,
        F: Fn(&Rc<GlContext>) -> Result<D> + 'static,
    {
        let name = name.into();
        log::debug!("registering demo '{name}'");
        let build = move |ctx: &Rc<GlContext>| -> Result<Box<dyn Demo>> {
            Ok(Box::new(factory(ctx)?))
        };
        self.entries.push((name, Box::new(build)));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draws one button per demo and builds the first one pressed.
    ///
    /// Returns the demo's name with the new instance.
    pub fn on_ui(
        &self,
        ctx: &Rc<GlContext>,
        ui: &mut dyn DemoUi,
    ) -> Result<Option<(String, Box<dyn Demo>)>> {
        let mut pressed = None;
        for (name, _) in &self.entries {
            if ui.button(name) && pressed.is_none() {
                pressed = Some(name.clone());
            }
        }

        match pressed {
            Some(name) => Ok(self.create(ctx, &name)?.map(|demo| (name, demo))),
            None => Ok(None),
        }
    }

    /// Builds the demo registered under `name`, if any.
    pub fn create(&self, ctx: &Rc<GlContext>, name: &str) -> Result<Option<Box<dyn Demo>>> {
        let Some((_, factory)) = self.entries.iter().find(|(n, _)| n == name) else {
            return Ok(None);
        };
        log::info!("starting demo '{name}'");
        factory(ctx).map(Some)
    }
}

impl fmt::Debug for DemoMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::demo::test_ui::ScriptedUi;
    use crate::demo::ClearColorDemo;
    use crate::gl::{ContextConfig, DummyBackend};

    struct Counter(Rc<Cell<u32>>);

    impl Demo for Counter {
        fn on_update(&mut self, _dt: f32) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn ctx() -> Rc<GlContext> {
        GlContext::new(DummyBackend::new(), ContextConfig::default())
    }

    #[test]
    fn names_keep_registration_order() {
        let mut menu = DemoMenu::new();
        menu.register("Clear Color", |_| Ok(ClearColorDemo::new()))
            .register("Quad", |_| Ok(ClearColorDemo::new()));

        assert_eq!(menu.names().collect::<Vec<_>>(), ["Clear Color", "Quad"]);
        assert_eq!(menu.len(), 2);
    }

    #[test]
    fn pressed_button_creates_that_demo() {
        let updates = Rc::new(Cell::new(0));
        let seen = Rc::clone(&updates);

        let mut menu = DemoMenu::new();
        menu.register("Clear Color", |_| Ok(ClearColorDemo::new()))
            .register("Counter", move |_| Ok(Counter(Rc::clone(&seen))));

        let mut ui = ScriptedUi::pressing("Counter");
        let (name, mut demo) = menu.on_ui(&ctx(), &mut ui).unwrap().unwrap();
        demo.on_update(0.016);

        assert_eq!(name, "Counter");
        assert_eq!(updates.get(), 1);
        assert_eq!(ui.buttons, ["Clear Color", "Counter"]);
    }

    #[test]
    fn no_press_creates_nothing() {
        let mut menu = DemoMenu::new();
        menu.register("Clear Color", |_| Ok(ClearColorDemo::new()));

        let mut ui = ScriptedUi::default();
        assert!(menu.on_ui(&ctx(), &mut ui).unwrap().is_none());
    }

    #[test]
    fn unknown_name_creates_nothing() {
        let menu = DemoMenu::new();
        assert!(menu.create(&ctx(), "Missing").unwrap().is_none());
    }
}
