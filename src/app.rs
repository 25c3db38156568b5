use eframe::egui;

use crate::crop::{CropRect, Handle, HitZone};
use crate::editor::EditorState;
use crate::error::EditorError;
use crate::filters::{FilterParams, Preset};
use crate::io::{self, ExportFormat};

const TOAST_SECONDS: f64 = 4.0;

#[derive(Clone, Copy, PartialEq, Eq)]
enum ToastKind {
    Info,
    Error,
}

struct Toast {
    text: String,
    kind: ToastKind,
    expires_at: f64,
}

pub struct EditorApp {
    editor: EditorState,
    texture: Option<egui::TextureHandle>,
    texture_revision: u64,
    export_format: ExportFormat,
    export_quality: u8,
    toasts: Vec<Toast>,
}

impl EditorApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            editor: EditorState::new(),
            texture: None,
            texture_revision: 0,
            export_format: ExportFormat::Png,
            export_quality: 90,
            toasts: Vec::new(),
        }
    }

    fn toast(&mut self, ctx: &egui::Context, kind: ToastKind, text: impl Into<String>) {
        self.toasts.push(Toast {
            text: text.into(),
            kind,
            expires_at: ctx.input(|i| i.time) + TOAST_SECONDS,
        });
    }

    /// Route an operation result into the toast area. `NoImageLoaded` never
    /// reaches here: those operations are silent no-ops by design.
    fn report(&mut self, ctx: &egui::Context, result: Result<(), EditorError>) {
        if let Err(err) = result {
            log::warn!("{err}");
            let text = match &err {
                EditorError::ClipboardUnavailable(_) => {
                    format!("{err}. Try drag-and-drop or Ctrl+V instead.")
                }
                _ => err.to_string(),
            };
            self.toast(ctx, ToastKind::Error, text);
        }
    }

    fn load_result(&mut self, ctx: &egui::Context, result: Result<io::LoadedImage, EditorError>) {
        match result.and_then(|loaded| self.editor.load(loaded)) {
            Ok(()) => {}
            Err(err) => self.report(ctx, Err(err)),
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.first() else { return };
        let result = if let Some(path) = &file.path {
            io::load_from_path(path)
        } else if let Some(bytes) = &file.bytes {
            io::load_from_bytes(bytes, &file.name)
        } else {
            return;
        };
        self.load_result(ctx, result);
    }

    fn open_dialog(&mut self, ctx: &egui::Context) {
        if let Some(path) = io::pick_open_path() {
            let result = io::load_from_path(&path);
            self.load_result(ctx, result);
        }
    }

    fn paste_clipboard(&mut self, ctx: &egui::Context) {
        let result = io::load_from_clipboard();
        self.load_result(ctx, result);
    }

    fn export(&mut self, ctx: &egui::Context) {
        let Some(surface) = self.editor.composited() else {
            return;
        };
        let Some(path) = io::pick_export_path(self.export_format) else {
            return;
        };
        let result = io::export(&surface, &path, self.export_format, self.export_quality);
        if result.is_ok() {
            log::info!("exported {}", path.display());
            self.toast(ctx, ToastKind::Info, format!("Saved {}", path.display()));
        }
        self.report(ctx, result);
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (undo, redo, paste, save, escape) = ctx.input_mut(|i| {
            (
                i.consume_key(egui::Modifiers::CTRL, egui::Key::Z),
                i.consume_key(egui::Modifiers::CTRL, egui::Key::Y),
                i.consume_key(egui::Modifiers::CTRL, egui::Key::V),
                i.consume_key(egui::Modifiers::CTRL, egui::Key::S),
                i.key_pressed(egui::Key::Escape),
            )
        });
        if undo {
            let r = self.editor.undo();
            self.report(ctx, r);
        }
        if redo {
            let r = self.editor.redo();
            self.report(ctx, r);
        }
        if paste {
            self.paste_clipboard(ctx);
        }
        if save {
            self.export(ctx);
        }
        // Escape confirms the crop, same as the button. There is no
        // discard-without-applying path.
        if escape && self.editor.crop.is_active() {
            let r = self.editor.confirm_crop();
            self.report(ctx, r);
        }
    }

    fn refresh_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() && self.texture_revision == self.editor.revision() {
            return;
        }
        let Some(surface) = self.editor.composited() else {
            self.texture = None;
            return;
        };
        let size = [surface.width() as usize, surface.height() as usize];
        let rgba = surface.to_rgba8();
        let pixels = rgba.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        self.texture = Some(ctx.load_texture("surface", color_image, egui::TextureOptions::LINEAR));
        self.texture_revision = self.editor.revision();
    }

    fn toolbar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            if ui.button("Open…").clicked() {
                self.open_dialog(ctx);
            }
            if ui.button("Paste").clicked() {
                self.paste_clipboard(ctx);
            }
            if ui
                .add_enabled(self.editor.has_image(), egui::Button::new("Export…"))
                .clicked()
            {
                self.export(ctx);
            }

            ui.separator();

            if ui
                .add_enabled(self.editor.can_undo(), egui::Button::new("Undo"))
                .clicked()
            {
                let r = self.editor.undo();
                self.report(ctx, r);
            }
            if ui
                .add_enabled(self.editor.can_redo(), egui::Button::new("Redo"))
                .clicked()
            {
                let r = self.editor.redo();
                self.report(ctx, r);
            }

            ui.separator();

            let cropping = self.editor.crop.is_active();
            let crop_label = if cropping { "Confirm Crop" } else { "Crop" };
            if ui
                .add_enabled(self.editor.has_image(), egui::Button::new(crop_label))
                .clicked()
            {
                if cropping {
                    let r = self.editor.confirm_crop();
                    self.report(ctx, r);
                } else {
                    self.editor.enter_crop();
                }
            }

            let enabled = self.editor.has_image();
            if ui.add_enabled(enabled, egui::Button::new("Rotate 90°")).clicked() {
                let r = self.editor.rotate_90();
                self.report(ctx, r);
            }
            if ui.add_enabled(enabled, egui::Button::new("Flip H")).clicked() {
                let r = self.editor.flip_horizontal();
                self.report(ctx, r);
            }
            if ui.add_enabled(enabled, egui::Button::new("Flip V")).clicked() {
                let r = self.editor.flip_vertical();
                self.report(ctx, r);
            }
            if ui.add_enabled(enabled, egui::Button::new("Reset")).clicked() {
                let r = self.editor.reset();
                self.report(ctx, r);
            }
        });
    }

    fn side_panel(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let enabled = self.editor.has_image();

        ui.heading("Adjustments");
        let mut params = self.editor.filters;
        ui.add_enabled_ui(enabled, |ui| {
            ui.add(egui::Slider::new(&mut params.brightness, 0..=200).text("Brightness"));
            ui.add(egui::Slider::new(&mut params.contrast, 0..=200).text("Contrast"));
            ui.add(egui::Slider::new(&mut params.saturation, 0..=200).text("Saturation"));
            ui.add(egui::Slider::new(&mut params.hue, 0..=360).text("Hue"));
            ui.add(egui::Slider::new(&mut params.blur, 0..=10).text("Blur"));
        });
        self.editor.set_filters(params);

        ui.add_space(8.0);
        ui.heading("Presets");
        ui.horizontal_wrapped(|ui| {
            for preset in Preset::ALL {
                if ui
                    .add_enabled(enabled, egui::Button::new(preset.label()))
                    .clicked()
                {
                    let r = self.editor.apply_preset(preset);
                    self.report(ctx, r);
                }
            }
            if ui.add_enabled(enabled, egui::Button::new("None")).clicked() {
                self.editor.set_filters(FilterParams::default());
            }
        });

        ui.add_space(8.0);
        ui.heading("Export");
        egui::ComboBox::from_label("Format")
            .selected_text(self.export_format.label())
            .show_ui(ui, |ui| {
                for format in ExportFormat::ALL {
                    ui.selectable_value(&mut self.export_format, format, format.label());
                }
            });
        if self.export_format == ExportFormat::Jpeg {
            ui.add(egui::Slider::new(&mut self.export_quality, 1..=100).text("Quality"));
        }

        if let (Some((w, h)), Some(info)) = (self.editor.dimensions(), self.editor.info.as_ref()) {
            ui.add_space(8.0);
            ui.separator();
            ui.label(format!("{w} × {h} px"));
            if let Some(bytes) = info.byte_size {
                ui.label(format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0));
            }
            ui.label(&info.source_label);
        }
    }

    fn image_view(&mut self, ui: &mut egui::Ui) {
        let Some(texture) = self.texture.clone() else {
            ui.centered_and_justified(|ui| {
                ui.label("Drop an image here, paste one, or use Open…");
            });
            return;
        };

        const PADDING: f32 = 20.0;
        let available = ui.available_size();
        let max_size = available - egui::vec2(PADDING * 2.0, PADDING * 2.0);
        let image_size = texture.size_vec2();

        let scale = (max_size.x / image_size.x)
            .min(max_size.y / image_size.y)
            .min(1.0)
            .max(0.01);
        let display_size = image_size * scale;

        // Center the image in the free space.
        let offset = (available - display_size) / 2.0;
        let origin = ui.cursor().min + egui::vec2(offset.x.max(0.0), offset.y.max(0.0));
        let image_rect = egui::Rect::from_min_size(origin, display_size);

        let response = ui.allocate_rect(image_rect, egui::Sense::click_and_drag());
        let painter = ui.painter_at(image_rect.expand(2.0));

        painter.image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        if !self.editor.crop.is_active() {
            return;
        }

        // Widget-space pointer → image pixel coordinates, clamped so a drag
        // that wanders off the widget cannot push the selection past the
        // surface.
        let to_image = |pos: egui::Pos2| -> egui::Pos2 {
            let p = (pos - image_rect.min) / scale;
            egui::pos2(p.x.clamp(0.0, image_size.x), p.y.clamp(0.0, image_size.y))
        };
        let to_screen =
            |pos: egui::Pos2| -> egui::Pos2 { image_rect.min + pos.to_vec2() * scale };

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.editor.crop.pointer_down(to_image(pos));
            }
        }
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.editor.crop.pointer_move(to_image(pos));
            }
        }
        if response.drag_stopped() {
            self.editor.crop.pointer_up();
        }

        // Cursor feedback for whatever is under the pointer.
        if let Some(hover) = response.hover_pos() {
            let icon = match self.editor.crop.hit_test(to_image(hover)) {
                HitZone::Handle(Handle::Nw) | HitZone::Handle(Handle::Se) => {
                    egui::CursorIcon::ResizeNwSe
                }
                HitZone::Handle(Handle::Ne) | HitZone::Handle(Handle::Sw) => {
                    egui::CursorIcon::ResizeNeSw
                }
                HitZone::Handle(Handle::N) | HitZone::Handle(Handle::S) => {
                    egui::CursorIcon::ResizeVertical
                }
                HitZone::Handle(Handle::E) | HitZone::Handle(Handle::W) => {
                    egui::CursorIcon::ResizeHorizontal
                }
                HitZone::Inside => egui::CursorIcon::Move,
                HitZone::Outside => egui::CursorIcon::Crosshair,
            };
            ui.ctx().output_mut(|o| o.cursor_icon = icon);
        }

        let Some(rect) = self.editor.crop.selection() else {
            return;
        };
        let screen_rect = egui::Rect::from_min_max(
            to_screen(egui::pos2(rect.x, rect.y)),
            to_screen(egui::pos2(rect.right(), rect.bottom())),
        );

        draw_crop_overlay(&painter, image_rect, screen_rect, rect, to_screen);
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        self.toasts.retain(|t| t.expires_at > now);
        if self.toasts.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    let color = match toast.kind {
                        ToastKind::Info => egui::Color32::from_rgb(40, 120, 60),
                        ToastKind::Error => egui::Color32::from_rgb(150, 50, 50),
                    };
                    egui::Frame::popup(ui.style())
                        .fill(color)
                        .show(ui, |ui| ui.colored_label(egui::Color32::WHITE, &toast.text));
                }
            });
        // Keep repainting so toasts disappear without needing input.
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}

/// Dim everything outside the selection, then the border and the 8 handles.
fn draw_crop_overlay(
    painter: &egui::Painter,
    image_rect: egui::Rect,
    screen_rect: egui::Rect,
    rect: CropRect,
    to_screen: impl Fn(egui::Pos2) -> egui::Pos2,
) {
    let overlay = egui::Color32::from_black_alpha(150);
    // Top band.
    painter.rect_filled(
        egui::Rect::from_min_max(
            image_rect.min,
            egui::pos2(image_rect.max.x, screen_rect.min.y),
        ),
        0.0,
        overlay,
    );
    // Bottom band.
    painter.rect_filled(
        egui::Rect::from_min_max(
            egui::pos2(image_rect.min.x, screen_rect.max.y),
            image_rect.max,
        ),
        0.0,
        overlay,
    );
    // Left band.
    painter.rect_filled(
        egui::Rect::from_min_max(
            egui::pos2(image_rect.min.x, screen_rect.min.y),
            egui::pos2(screen_rect.min.x, screen_rect.max.y),
        ),
        0.0,
        overlay,
    );
    // Right band.
    painter.rect_filled(
        egui::Rect::from_min_max(
            egui::pos2(screen_rect.max.x, screen_rect.min.y),
            egui::pos2(image_rect.max.x, screen_rect.max.y),
        ),
        0.0,
        overlay,
    );

    painter.rect_stroke(
        screen_rect,
        0.0,
        egui::Stroke::new(1.0, egui::Color32::WHITE),
    );

    let handle_stroke = egui::Stroke::new(1.0, egui::Color32::BLACK);
    for handle in Handle::ALL {
        painter.circle(
            to_screen(rect.handle_pos(handle)),
            6.0,
            egui::Color32::WHITE,
            handle_stroke,
        );
    }
}

impl eframe::App for EditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        self.handle_shortcuts(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.toolbar(ctx, ui);
        });

        egui::SidePanel::right("controls")
            .min_width(220.0)
            .show(ctx, |ui| {
                self.side_panel(ctx, ui);
            });

        // After all controls have run, so the frame paints the final state.
        self.refresh_texture(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.image_view(ui);
        });

        self.show_toasts(ctx);
    }
}
