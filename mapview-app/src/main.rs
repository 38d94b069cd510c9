use anyhow::Context as _;
use mapview::{
    constants::VIEWPORT_MARGIN, Action, Direction, HttpTransport, InputEvent, InputHandler,
    KeyCode, Layer, MouseButton, Outcome, ViewController, ViewerConfig,
};

/// Standalone map viewer application
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ViewerConfig::from_env().context("invalid viewer configuration")?;
    let transport = HttpTransport::new(&config.services);
    let viewport = config.view.viewport;

    // Nothing can be shown without the first image, so a failure here ends the process
    let controller = ViewController::new(config, transport).map_err(|e| {
        log::error!("initial map request failed: {}", e);
        e
    })?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([
                viewport.width as f32 + 2.0 * VIEWPORT_MARGIN as f32,
                viewport.height as f32 + 180.0,
            ])
            .with_title("Map viewer"),
        ..Default::default()
    };

    eframe::run_native(
        "mapview-app",
        options,
        Box::new(move |_cc| Box::new(ViewerApp::new(controller))),
    )
    .map_err(|e| anyhow::anyhow!("viewer window failed: {e}"))
}

/// The main application struct
struct ViewerApp {
    controller: ViewController<HttpTransport>,
    handler: InputHandler,
    texture: MapTexture,
    query: String,
    show_postal_code: bool,
}

impl ViewerApp {
    fn new(controller: ViewController<HttpTransport>) -> Self {
        Self {
            controller,
            handler: InputHandler::new(),
            texture: MapTexture::default(),
            query: String::new(),
            show_postal_code: false,
        }
    }

    fn apply(&mut self, action: Action) {
        report(self.controller.dispatch(action));
    }

    fn sync_texture(&mut self, ctx: &egui::Context) {
        let generation = self.controller.image_generation();
        let bytes = self.controller.image().map(|image| image.bytes());
        self.texture.sync(ctx, generation, bytes);
    }

    fn keyboard(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        const KEYS: [(egui::Key, KeyCode); 9] = [
            (egui::Key::ArrowUp, KeyCode::ArrowUp),
            (egui::Key::ArrowDown, KeyCode::ArrowDown),
            (egui::Key::ArrowLeft, KeyCode::ArrowLeft),
            (egui::Key::ArrowRight, KeyCode::ArrowRight),
            (egui::Key::PageUp, KeyCode::PageUp),
            (egui::Key::PageDown, KeyCode::PageDown),
            (egui::Key::Plus, KeyCode::Plus),
            (egui::Key::Minus, KeyCode::Minus),
            (egui::Key::Escape, KeyCode::Escape),
        ];
        for (egui_key, key) in KEYS {
            if ctx.input(|i| i.key_pressed(egui_key)) {
                let outcome = self
                    .controller
                    .handle_event(&self.handler, &InputEvent::KeyPress { key });
                report(outcome);
            }
        }
    }

    fn map_view(&mut self, ui: &mut egui::Ui) {
        let size = self.controller.viewport();
        let (rect, response) = ui.allocate_exact_size(
            egui::vec2(size.width as f32, size.height as f32),
            egui::Sense::click(),
        );
        if let Some(texture) = self.texture.handle() {
            ui.painter().image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }

        let button = if response.clicked() {
            Some(MouseButton::Left)
        } else if response.secondary_clicked() {
            Some(MouseButton::Right)
        } else {
            None
        };
        if let (Some(button), Some(pos)) = (button, response.interact_pointer_pos()) {
            let (x, y) = window_pixel(pos, rect);
            let outcome = self
                .controller
                .handle_event(&self.handler, &InputEvent::Click { x, y, button });
            report(outcome);
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for layer in Layer::ALL {
                let selected = self.controller.state().layer() == layer;
                if ui.selectable_label(selected, layer.as_param()).clicked() {
                    self.apply(Action::SetLayer(layer));
                }
            }
            ui.separator();
            for (label, direction) in [
                ("←", Direction::Left),
                ("↑", Direction::Up),
                ("↓", Direction::Down),
                ("→", Direction::Right),
            ] {
                if ui.button(label).clicked() {
                    self.apply(Action::Move(direction));
                }
            }
        });

        ui.horizontal(|ui| {
            let field = ui.text_edit_singleline(&mut self.query);
            let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Find").clicked() || submitted {
                let query = self.query.clone();
                self.apply(Action::Search(query));
            }
            if ui
                .checkbox(&mut self.show_postal_code, "Show postal code")
                .changed()
            {
                self.apply(Action::SetShowPostalCode(self.show_postal_code));
            }
        });

        if ui.button("Clear search result").clicked() {
            self.apply(Action::Clear);
        }

        ui.label(self.controller.text());
        if let Some(status) = self.controller.status() {
            ui.colored_label(egui::Color32::DARK_RED, status);
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.keyboard(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.sync_texture(ui.ctx());
            self.map_view(ui);
            ui.separator();
            self.controls(ui);
        });

        // Actions above may have replaced the image
        self.sync_texture(ctx);
    }
}

impl Drop for ViewerApp {
    fn drop(&mut self) {
        self.controller.shutdown();
    }
}

/// GPU copy of the controller's current image
#[derive(Default)]
struct MapTexture {
    handle: Option<egui::TextureHandle>,
    /// Image generation last decoded, whether or not decoding succeeded
    generation: Option<u64>,
}

impl MapTexture {
    fn handle(&self) -> Option<&egui::TextureHandle> {
        self.handle.as_ref()
    }

    /// Decodes and uploads `bytes` once per generation. Returns whether a
    /// decode was attempted.
    fn sync(&mut self, ctx: &egui::Context, generation: u64, bytes: Option<&[u8]>) -> bool {
        if self.generation == Some(generation) {
            return false;
        }
        let Some(bytes) = bytes else {
            return false;
        };
        self.generation = Some(generation);
        match decode_map_image(bytes) {
            Ok(color_image) => {
                self.handle =
                    Some(ctx.load_texture("map", color_image, egui::TextureOptions::LINEAR));
            }
            // The previous texture stays on screen
            Err(e) => log::error!("cannot decode map image {}: {:#}", generation, e),
        }
        true
    }
}

fn report(outcome: Outcome) {
    match outcome {
        Outcome::Failed(e) => log::warn!("{}", e),
        Outcome::NothingFound => log::info!("nothing found"),
        other => log::debug!("{:?}", other),
    }
}

/// Window position as the controller expects it: relative to a window whose
/// map image starts at the margin
fn window_pixel(pos: egui::Pos2, rect: egui::Rect) -> (i32, i32) {
    (
        (pos.x - rect.min.x).round() as i32 + VIEWPORT_MARGIN,
        (pos.y - rect.min.y).round() as i32 + VIEWPORT_MARGIN,
    )
}

fn decode_map_image(bytes: &[u8]) -> anyhow::Result<egui::ColorImage> {
    let rgba = image::load_from_memory(bytes)
        .context("unsupported map image format")?
        .to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}
