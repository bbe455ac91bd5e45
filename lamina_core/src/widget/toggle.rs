// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box-and-label visuals shared by checkboxes and radio buttons.
//!
//! The private layout is a horizontal flow of a box and a label. The box holds
//! three meshes centred on it (frame, hover highlight and check mark), the
//! label a single text mesh anchored at its top-left corner.
//!
//! ```text
//! widget node
//! ├── material node (`<prefix>.material.widget`)
//! │   └── transform (box centre)
//! │       ├── frame
//! │       ├── highlight   hidden unless hovered
//! │       └── check       hidden unless the value is true
//! └── text material node (`<prefix>.material.text`)
//!     └── transform (label origin)
//!         └── label
//! ```

use alloc::string::String;

use kurbo::{Point, Rect};
use lamina_layout::{ElementId, ElementKind, Length, Margin, Size};
use lamina_scene::font::{FontId, FontMap};
use lamina_scene::generator::ScenegraphGenerator;
use lamina_scene::mesh::{FillMode, MeshDesc, MeshId, MeshManager, Rgba};
use lamina_scene::node::{MaterialId, NodeId, NodeMask};
use lamina_scene::transform::Offset;

use super::{Retired, WidgetBase, WidgetContext};
use crate::error::Error;
use crate::stale::{Change, StaleData};

/// Inset of the box meshes from the box block.
const BOX_INSET: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum CheckShape {
    Square,
    Circle,
}

/// Style property names of one toggle widget type.
#[derive(Debug)]
pub(super) struct ToggleStyle {
    box_width: &'static str,
    box_height: &'static str,
    box_size: &'static str,
    box_margin: &'static str,
    label_width: &'static str,
    label_height: &'static str,
    label_size: &'static str,
    label_margin: &'static str,
    material_widget: &'static str,
    material_text: &'static str,
    check: CheckShape,
}

pub(super) static CHECKBOX: ToggleStyle = ToggleStyle {
    box_width: "checkbox.box.width",
    box_height: "checkbox.box.height",
    box_size: "checkbox.box.size",
    box_margin: "checkbox.box.margin",
    label_width: "checkbox.label.width",
    label_height: "checkbox.label.height",
    label_size: "checkbox.label.size",
    label_margin: "checkbox.label.margin",
    material_widget: "checkbox.material.widget",
    material_text: "checkbox.material.text",
    check: CheckShape::Square,
};

pub(super) static RADIO_BUTTON: ToggleStyle = ToggleStyle {
    box_width: "radiobutton.box.width",
    box_height: "radiobutton.box.height",
    box_size: "radiobutton.box.size",
    box_margin: "radiobutton.box.margin",
    label_width: "radiobutton.label.width",
    label_height: "radiobutton.label.height",
    label_size: "radiobutton.label.size",
    label_margin: "radiobutton.label.margin",
    material_widget: "radiobutton.material.widget",
    material_text: "radiobutton.material.text",
    check: CheckShape::Circle,
};

pub(super) const BOX_WIDTH_DEFAULT: Length = Length::Relative(0.1);
pub(super) const LABEL_WIDTH_DEFAULT: Length = Length::Relative(0.9);

/// Style properties every widget understands.
pub(super) mod common {
    pub(crate) const COLOR: &str = "color";
    pub(crate) const FONT: &str = "font";
    pub(crate) const MATERIAL_WIDGET: &str = "material.widget";
    pub(crate) const MATERIAL_TEXT: &str = "material.text";
}

/// Resolves a length from its own key, then from the width or height of a
/// size key.
pub(super) fn style_length(
    base: &WidgetBase,
    cx: &WidgetContext<'_>,
    key: &str,
    size_key: &str,
    pick: fn(Size) -> Length,
    default: Length,
) -> Length {
    base.style::<Length>(cx, key)
        .or_else(|| base.style::<Size>(cx, size_key).map(pick))
        .unwrap_or(default)
}

pub(super) fn style_color(base: &WidgetBase, cx: &WidgetContext<'_>) -> Rgba {
    base.style(cx, common::COLOR).unwrap_or(Rgba::WHITE)
}

pub(super) fn style_material(
    base: &WidgetBase,
    cx: &WidgetContext<'_>,
    key: &str,
    fallback: &str,
) -> Option<MaterialId> {
    base.style(cx, key).or_else(|| base.style(cx, fallback))
}

pub(super) fn style_font(
    base: &WidgetBase,
    cx: &WidgetContext<'_>,
    fonts: &FontMap,
) -> Option<FontId> {
    fonts.resolve(base.style::<String>(cx, common::FONT).as_deref())
}

/// Returns the type mask showing or hiding a node.
pub(super) fn visibility(visible: bool) -> NodeMask {
    if visible {
        NodeMask::empty()
    } else {
        NodeMask::DISABLED
    }
}

/// Destroys `mesh` and creates a replacement from `desc`.
pub(super) fn rebuild_mesh(meshes: &mut dyn MeshManager, mesh: &mut MeshId, desc: MeshDesc) {
    meshes.destroy_mesh(*mesh);
    *mesh = meshes.create_mesh(desc);
}

#[derive(Clone, Copy, Debug)]
struct ToggleElements {
    root: ElementId,
    boxed: ElementId,
    label: ElementId,
}

/// Mesh handles of a checkbox or radio button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToggleMeshes {
    /// Box outline.
    pub frame: MeshId,
    /// Filled box shown while hovered.
    pub highlight: MeshId,
    /// Check mark shown while the value is true.
    pub check: MeshId,
    /// Label text.
    pub label: MeshId,
}

/// Scenegraph node handles of a checkbox or radio button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToggleNodes {
    /// Widget root.
    pub root: NodeId,
    /// Material for the box meshes.
    pub material: NodeId,
    /// Material for the label.
    pub text_material: NodeId,
    /// Transform placing the box meshes.
    pub box_transform: NodeId,
    /// Box outline.
    pub frame: NodeId,
    /// Hover highlight.
    pub highlight: NodeId,
    /// Check mark.
    pub check: NodeId,
    /// Transform placing the label.
    pub label_transform: NodeId,
    /// Label text.
    pub label: NodeId,
}

#[derive(Debug)]
pub(super) struct ToggleVisual {
    style: &'static ToggleStyle,
    elements: Option<ToggleElements>,
    pub(super) meshes: Option<ToggleMeshes>,
    pub(super) nodes: Option<ToggleNodes>,
}

impl ToggleVisual {
    pub(super) const fn new(style: &'static ToggleStyle) -> Self {
        Self {
            style,
            elements: None,
            meshes: None,
            nodes: None,
        }
    }

    pub(super) fn generate_layout(
        &mut self,
        base: &mut WidgetBase,
        cx: &WidgetContext<'_>,
        size: kurbo::Size,
        offset: Point,
    ) {
        let style = self.style;
        let box_size = Size::new(
            style_length(base, cx, style.box_width, style.box_size, |s| s.width, BOX_WIDTH_DEFAULT),
            style_length(base, cx, style.box_height, style.box_size, |s| s.height, Length::FULL),
        );
        let box_margin = base.style::<Margin>(cx, style.box_margin).unwrap_or(Margin::ZERO);
        let label_size = Size::new(
            style_length(base, cx, style.label_width, style.label_size, |s| s.width, LABEL_WIDTH_DEFAULT),
            style_length(base, cx, style.label_height, style.label_size, |s| s.height, Length::FULL),
        );
        let label_margin = base.style::<Margin>(cx, style.label_margin).unwrap_or(Margin::ZERO);

        let layout = base.layout_mut();
        let elements = *self.elements.get_or_insert_with(|| {
            let root = layout.set_root(ElementKind::HorizontalFlow);
            ToggleElements {
                root,
                boxed: layout.append(root, ElementKind::Leaf),
                label: layout.append(root, ElementKind::Leaf),
            }
        });

        layout.set_element_size(elements.root, Size::FULL);
        layout.set_element_size(elements.boxed, box_size);
        layout.set_element_margin(elements.boxed, box_margin);
        layout.set_element_size(elements.label, label_size);
        layout.set_element_margin(elements.label, label_margin);

        base.generate_layout(size, offset);
    }

    /// Returns the box and label bounds.
    fn bounds(&self, base: &WidgetBase) -> Result<(Rect, Rect), Error> {
        let elements = self.elements.ok_or(Error::LayoutNotGenerated)?;
        match (base.block(elements.boxed), base.block(elements.label)) {
            (Some(boxed), Some(label)) => Ok((boxed, label)),
            _ => Err(Error::LayoutNotGenerated),
        }
    }

    pub(super) fn box_bounds(&self, base: &WidgetBase) -> Option<Rect> {
        self.bounds(base).ok().map(|(boxed, _)| boxed)
    }

    pub(super) fn generate_geometry(
        &mut self,
        base: &WidgetBase,
        cx: &WidgetContext<'_>,
        meshes: &mut dyn MeshManager,
        fonts: &FontMap,
        label: &str,
    ) -> Result<(), Error> {
        base.require(StaleData::GEOMETRY)?;
        let (boxed, label_rect) = self.bounds(base)?;
        let changes = base.take_geometry_changes();
        let color = style_color(base, cx);

        let label_desc = MeshDesc::Text {
            text: label.into(),
            font: style_font(base, cx, fonts),
            height: label_rect.height(),
            color,
        };

        match &mut self.meshes {
            Some(current) if !changes.intersects(Change::STYLESHEET | Change::ANCHOR) => {
                if changes.contains(Change::LABEL) {
                    rebuild_mesh(meshes, &mut current.label, label_desc);
                }
            }
            slot => {
                if let Some(old) = slot.take() {
                    for mesh in [old.frame, old.highlight, old.check, old.label] {
                        meshes.destroy_mesh(mesh);
                    }
                }
                let half = (boxed.width().min(boxed.height()) * 0.5 - BOX_INSET).max(0.0);
                let square = Rect::new(-half, -half, half, half);
                let check = match self.style.check {
                    CheckShape::Square => MeshDesc::Rectangle {
                        rect: square.inset(-half * 0.4),
                        fill: FillMode::Fill,
                        color,
                    },
                    CheckShape::Circle => MeshDesc::Circle {
                        radius: half * 0.6,
                        fill: FillMode::Fill,
                        color,
                    },
                };
                *slot = Some(ToggleMeshes {
                    frame: meshes.create_mesh(MeshDesc::Rectangle {
                        rect: square,
                        fill: FillMode::Outline,
                        color,
                    }),
                    highlight: meshes.create_mesh(MeshDesc::Rectangle {
                        rect: square,
                        fill: FillMode::Fill,
                        color: Rgba { a: 0.25, ..color },
                    }),
                    check: meshes.create_mesh(check),
                    label: meshes.create_mesh(label_desc),
                });
            }
        }

        base.finish(StaleData::GEOMETRY);
        Ok(())
    }

    pub(super) fn generate_scenegraph(
        &mut self,
        base: &WidgetBase,
        cx: &WidgetContext<'_>,
        generator: &mut dyn ScenegraphGenerator,
        checked: bool,
    ) -> Result<(), Error> {
        base.require(StaleData::SCENEGRAPH)?;
        let meshes = self.meshes.ok_or(Error::GeometryNotGenerated)?;
        let (boxed, label) = self.bounds(base)?;
        let box_offset = Offset::at(boxed.center(), cx.z());
        let label_offset = Offset::at(label.origin(), cx.z());
        let material = style_material(base, cx, self.style.material_widget, common::MATERIAL_WIDGET);
        let text_material = style_material(base, cx, self.style.material_text, common::MATERIAL_TEXT);

        let nodes = *self.nodes.get_or_insert_with(|| {
            let root = generator.create_widget_node(cx.panel_node);
            let material_node = generator.create_material_node(root, material);
            let box_transform = generator.create_transform_node(material_node, box_offset);
            let frame = generator.create_mesh_node(box_transform, Some(meshes.frame));
            let highlight = generator.create_mesh_node(box_transform, Some(meshes.highlight));
            let check = generator.create_mesh_node(box_transform, Some(meshes.check));
            let text_material_node = generator.create_text_material_node(root, text_material);
            let label_transform = generator.create_transform_node(text_material_node, label_offset);
            let label = generator.create_mesh_node(label_transform, Some(meshes.label));
            ToggleNodes {
                root,
                material: material_node,
                text_material: text_material_node,
                box_transform,
                frame,
                highlight,
                check,
                label_transform,
                label,
            }
        });

        generator.set_material(nodes.material, material);
        generator.set_material(nodes.text_material, text_material);
        generator.set_offset(nodes.box_transform, box_offset);
        generator.set_offset(nodes.label_transform, label_offset);
        generator.set_mesh(nodes.frame, Some(meshes.frame));
        generator.set_mesh(nodes.highlight, Some(meshes.highlight));
        generator.set_mesh(nodes.check, Some(meshes.check));
        generator.set_mesh(nodes.label, Some(meshes.label));
        generator.set_type_mask(nodes.highlight, visibility(base.is_hovered()));
        generator.set_type_mask(nodes.check, visibility(checked));

        base.finish(StaleData::SCENEGRAPH);
        Ok(())
    }

    pub(super) fn retire(&mut self) -> Retired {
        let mut retired = Retired::default();
        if let Some(m) = self.meshes.take() {
            retired
                .meshes
                .extend([m.frame, m.highlight, m.check, m.label]);
        }
        if let Some(n) = self.nodes.take() {
            retired.nodes.push(n.root);
        }
        retired
    }
}
