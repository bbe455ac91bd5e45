// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated settings panel that exercises the widget pipeline end to end.
//!
//! Builds a panel with a checkbox, a radio group and a dropdown bound to
//! shared data sources, then replays a short sequence of clicks. Every pass
//! is reported to both a
//! [`PrettyPrintSink`](lamina_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](lamina_debug::recorder::RecorderSink), and the recording
//! is exported as a Chrome trace JSON file at the end.

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use kurbo::Point;
use lamina_core::Panel;
use lamina_core::data::{
    BoolDataSource, BoolValue, IntegralValue, IntegralValueDataSource, ListDataSource, ListValue,
};
use lamina_core::input::{MouseClickEvent, MouseMoveEvent, NullInput};
use lamina_core::style::Stylesheet;
use lamina_core::trace::{
    PassBeginEvent, PassEndEvent, PhaseBeginEvent, PhaseEndEvent, ReleaseEvent, TraceSink,
    Tracer, WidgetGeneratedEvent,
};
use lamina_core::widget::{Checkbox, Dropdown, RadioButton, Widget, WidgetId};
use lamina_layout::{ElementKind, Length, Size};
use lamina_scene::font::FontMap;
use lamina_scene::generator::SceneGenerator;
use lamina_scene::mesh::MeshStore;
use lamina_scene::node::MaterialId;

use lamina_debug::pretty::PrettyPrintSink;
use lamina_debug::recorder::RecorderSink;

const ROW_HEIGHT: f64 = 24.0;
const ROWS: usize = 5;

/// Forwards every event to two sinks.
struct Tee<'a> {
    pretty: &'a mut PrettyPrintSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Tee<'_> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.pretty.on_pass_begin(e);
        self.recorder.on_pass_begin(e);
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        self.pretty.on_pass_end(e);
        self.recorder.on_pass_end(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.pretty.on_phase_begin(e);
        self.recorder.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.pretty.on_phase_end(e);
        self.recorder.on_phase_end(e);
    }

    fn on_widget_generated(&mut self, e: &WidgetGeneratedEvent) {
        self.pretty.on_widget_generated(e);
        self.recorder.on_widget_generated(e);
    }

    fn on_release(&mut self, e: &ReleaseEvent) {
        self.pretty.on_release(e);
        self.recorder.on_release(e);
    }
}

/// Renderer-side state a host would own.
struct Host {
    meshes: MeshStore,
    fonts: FontMap,
    scene: SceneGenerator,
}

impl Host {
    fn new() -> Self {
        let mut fonts = FontMap::new();
        let sans = fonts.register("sans");
        fonts.set_default(sans);
        Self {
            meshes: MeshStore::new(),
            fonts,
            scene: SceneGenerator::new(),
        }
    }

    fn pass(&mut self, panel: &mut Panel, sink: &mut Tee<'_>) -> Result<(), Box<dyn Error>> {
        panel.generate(
            &mut self.meshes,
            &self.fonts,
            &mut self.scene,
            &mut Tracer::new(sink),
        )?;
        let changes = self.scene.evaluate();
        println!(
            "  scene: {} added, {} removed, {} rebound, {} enabled, {} disabled; {} live meshes",
            changes.added.len(),
            changes.removed.len(),
            changes.meshes.len(),
            changes.enabled.len(),
            changes.disabled.len(),
            self.meshes.len(),
        );
        Ok(())
    }
}

/// Returns the center of a widget's anchor block.
fn center_of(panel: &Panel, id: WidgetId) -> Result<Point, Box<dyn Error>> {
    let bounds = panel
        .widget(id)?
        .base()
        .anchor_bounds()
        .ok_or("widget has no anchor block")?;
    Ok(bounds.center())
}

/// Hit-tests `point` and delivers a left press to whatever is there.
fn click(panel: &mut Panel, point: Point) -> Result<(), Box<dyn Error>> {
    let Some(id) = panel.widget_at(point) else {
        println!("click at ({}, {}) hit nothing", point.x, point.y);
        return Ok(());
    };
    let result = panel.on_mouse_click(id, &MouseClickEvent::left_press(point))?;
    println!(
        "click at ({}, {}) -> {} claim={}",
        point.x,
        point.y,
        panel.widget(id)?.kind().name(),
        result.claim,
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let mut recorder = RecorderSink::new();
    let mut sink = Tee {
        pretty: &mut pretty,
        recorder: &mut recorder,
    };

    // -- panel layout ------------------------------------------------------
    let mut panel = Panel::new(NullInput);
    let rows = {
        let layout = panel.layout_mut();
        layout.set_size(kurbo::Size::new(320.0, ROW_HEIGHT * ROWS as f64));
        let root = layout.set_root(ElementKind::VerticalFlow);
        (0..ROWS)
            .map(|_| {
                let row = layout.append(root, ElementKind::Leaf);
                let size = Size::new(Length::FULL, Length::Absolute(ROW_HEIGHT));
                layout.set_element_size(row, size);
                row
            })
            .collect::<Vec<_>>()
    };
    panel.create_layer("popup", 10)?;
    panel.set_stylesheet(Some(Rc::new(
        Stylesheet::new()
            .with("material.widget", MaterialId(1))
            .with("material.text", MaterialId(2))
            .with("dropdown.items.max", 3_usize),
    )));

    // -- data --------------------------------------------------------------
    let sound = Rc::new(BoolValue::new(true));
    let quality = Rc::new(IntegralValue::new(0));
    let qualities = Rc::new(ListValue::new(["Low", "Medium", "High", "Ultra"]));

    // -- widgets -----------------------------------------------------------
    let mut checkbox = Checkbox::new("Sound");
    let source: Rc<dyn BoolDataSource> = sound.clone();
    checkbox.set_data_source(Some(source));
    let checkbox = panel.add_widget(checkbox);

    let modes = [Rc::new(BoolValue::new(true)), Rc::new(BoolValue::new(false))];
    let mut button = RadioButton::new("Windowed");
    let source: Rc<dyn BoolDataSource> = modes[0].clone();
    button.set_data_source(Some(source));
    let windowed = panel.add_widget(button);
    let mut button = RadioButton::grouped(&panel, windowed, "Fullscreen")?;
    let source: Rc<dyn BoolDataSource> = modes[1].clone();
    button.set_data_source(Some(source));
    let fullscreen = panel.add_widget(button);

    let mut dropdown = Dropdown::new("Quality");
    let items: Rc<dyn ListDataSource> = qualities.clone();
    let index: Rc<dyn IntegralValueDataSource> = quality.clone();
    dropdown.set_items_data_source(Some(items));
    dropdown.set_index_data_source(Some(index));
    let dropdown = panel.add_widget_to_layer(dropdown, "popup")?;

    for (id, row) in [checkbox, windowed, fullscreen, dropdown].into_iter().zip(rows) {
        panel.set_widget_anchor(id, Some(row))?;
    }

    let mut host = Host::new();

    println!("== initial pass");
    host.pass(&mut panel, &mut sink)?;

    println!("== toggle sound");
    let point = center_of(&panel, checkbox)?;
    click(&mut panel, point)?;
    println!("  sound = {}", sound.get());
    host.pass(&mut panel, &mut sink)?;

    println!("== select fullscreen");
    let point = center_of(&panel, fullscreen)?;
    click(&mut panel, point)?;
    println!(
        "  windowed = {}, fullscreen = {}",
        panel.get::<RadioButton>(windowed)?.is_checked(),
        panel.get::<RadioButton>(fullscreen)?.is_checked(),
    );
    host.pass(&mut panel, &mut sink)?;

    println!("== open quality list and pick the third item");
    let anchor = panel
        .widget(dropdown)?
        .base()
        .anchor_bounds()
        .ok_or("dropdown has no anchor block")?;
    click(&mut panel, Point::new(anchor.x0 + 1.0, anchor.center().y))?;
    host.pass(&mut panel, &mut sink)?;
    let row = Point::new(anchor.x0 + 1.0, anchor.y1 + ROW_HEIGHT * 2.5);
    panel.on_mouse_move(dropdown, &MouseMoveEvent { position: row })?;
    click(&mut panel, row)?;
    println!("  quality = {}", quality.get());
    host.pass(&mut panel, &mut sink)?;

    println!("== change the items from outside");
    qualities.push("Custom");
    host.pass(&mut panel, &mut sink)?;

    println!("== remove the radio group member");
    panel.destroy_widget(fullscreen)?;
    host.pass(&mut panel, &mut sink)?;

    println!("== tear down");
    panel.destroy(&mut host.meshes, &mut host.scene);
    println!("  {} live meshes", host.meshes.len());

    drop(sink);

    // -- export ------------------------------------------------------------
    let path = "lamina_trace.json";
    let mut writer = BufWriter::new(File::create(path)?);
    lamina_debug::chrome::export(recorder.as_bytes(), &mut writer)?;
    println!("Wrote {path}");
    Ok(())
}
