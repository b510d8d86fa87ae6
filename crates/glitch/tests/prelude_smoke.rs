#![forbid(unsafe_code)]

//! The prelude is enough to mount a visual and drive a menu.

use std::rc::Rc;

use glitch::prelude::*;
use glitch::runtime::ElementId;

#[test]
fn mount_visual_through_prelude() {
    let host = Rc::new(ManualHost::new());
    let el = ElementId::new(3);
    host.attach(el);

    let fx = TextScramble::new(fx::ScrambleConfig::new("hello"));
    let mut c = AnimatedComponent::new(fx, Rc::clone(&host), el);
    c.on_attach(&EnvSignals::desktop());

    let token = host.observer_for(el).expect("observing");
    c.on_intersection(token, 1.0);
    assert!(c.is_running());

    c.on_detach();
    assert!(host.pending_frames().is_empty());
}

#[test]
fn drive_menu_through_prelude() {
    let mut menu = FilterMenu::in_memory(vec![
        MenuItem::new("home", "Home"),
        MenuItem::new("chrome", "Chrome"),
    ]);
    menu.open();
    menu.handle_event(&Event::Key(KeyEvent::new(KeyCode::Char('h'))), 0.0);
    menu.tick(100.0);
    assert_eq!(menu.selected_item().map(|i| i.id.as_str()), Some("home"));
}
