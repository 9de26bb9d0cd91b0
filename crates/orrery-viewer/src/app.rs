//! Main application

use std::path::PathBuf;

use glam::Vec2;
use orrery_core::{ElementId, World};

use crate::config::SharedConfig;
use crate::viewport_state::ViewportState;

/// Command line choices that override the stored configuration for one run.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub scene: Option<PathBuf>,
    pub bloom: bool,
    pub paused: bool,
}

enum MenuAction {
    Open(PathBuf),
    Reload,
    ResetCamera,
    Quit,
}

pub struct OrreryApp {
    config: SharedConfig,
    world: World,
    scene_path: Option<PathBuf>,
    viewport: Option<ViewportState>,
    selected: Option<ElementId>,
    /// Attribute text being edited for the selected element
    edits: Vec<(&'static str, String)>,
    status: Option<String>,
    show_elements_panel: bool,
    dropped_frames: u64,
}

impl OrreryApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: SharedConfig,
        options: LaunchOptions,
    ) -> Self {
        let app_config = config.read().config().clone();
        cc.egui_ctx.set_zoom_factor(app_config.ui.zoom_factor);

        let viewport = match cc.wgpu_render_state.as_ref() {
            Some(render_state) => {
                let mut viewport = ViewportState::new(
                    render_state.device.clone(),
                    render_state.queue.clone(),
                    render_state.target_format,
                    &app_config.renderer,
                );
                viewport.set_bloom_enabled(options.bloom && app_config.renderer.bloom.enabled);
                Some(viewport)
            }
            None => {
                tracing::error!("wgpu render state unavailable, viewport disabled");
                None
            }
        };

        let mut app = Self {
            config,
            world: World::default(),
            scene_path: None,
            viewport,
            selected: None,
            edits: Vec::new(),
            status: None,
            show_elements_panel: app_config.ui.show_elements_panel,
            dropped_frames: 0,
        };

        if let Some(path) = options.scene.or(app_config.last_scene) {
            app.open_scene(path);
        }
        if options.paused {
            app.world.clock_mut().pause();
        }
        app
    }

    fn open_scene(&mut self, path: PathBuf) {
        match World::load(&path) {
            Ok(mut world) => {
                if self.world.clock().is_paused() {
                    world.clock_mut().pause();
                }
                if let Some(viewport) = self.viewport.as_mut() {
                    viewport.reset_for_world(&world);
                }
                self.world = world;
                self.selected = None;
                self.edits.clear();
                self.status = Some(format!(
                    "Loaded {} ({} elements)",
                    path.display(),
                    self.world.elements().len()
                ));

                self.config.write().config_mut().last_scene = Some(path.clone());
                self.persist_config();
                self.scene_path = Some(path);
            }
            Err(e) => {
                tracing::error!("Failed to open scene {:?}: {}", path, e);
                self.status = Some(e.to_string());
            }
        }
    }

    fn persist_config(&self) {
        if let Err(e) = self.config.write().save() {
            tracing::warn!("Failed to save config: {}", e);
        }
    }

    fn select(&mut self, id: ElementId) {
        self.selected = Some(id);
        self.refresh_edits();
    }

    fn refresh_edits(&mut self) {
        self.edits = self
            .selected
            .and_then(|id| self.world.element(id))
            .map(|element| element.attributes(self.world.scene()))
            .unwrap_or_default();
    }

    fn menu_bar(&mut self, ctx: &egui::Context) -> Option<MenuAction> {
        let mut action = None;
        let mut panel_toggled = false;

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Scene...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Orrery Scene", &["ron"])
                            .pick_file()
                        {
                            action = Some(MenuAction::Open(path));
                        }
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(self.scene_path.is_some(), egui::Button::new("Reload"))
                        .clicked()
                    {
                        action = Some(MenuAction::Reload);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        action = Some(MenuAction::Quit);
                        ui.close_menu();
                    }
                });
                ui.menu_button("View", |ui| {
                    panel_toggled = ui
                        .checkbox(&mut self.show_elements_panel, "Elements Panel")
                        .changed();
                    if ui.button("Reset Camera").clicked() {
                        action = Some(MenuAction::ResetCamera);
                        ui.close_menu();
                    }
                });
            });
        });

        if panel_toggled {
            self.config.write().config_mut().ui.show_elements_panel = self.show_elements_panel;
            self.persist_config();
        }
        action
    }

    fn handle_menu_action(&mut self, ctx: &egui::Context, action: MenuAction) {
        match action {
            MenuAction::Open(path) => self.open_scene(path),
            MenuAction::Reload => {
                if let Some(path) = self.scene_path.clone() {
                    self.open_scene(path);
                }
            }
            MenuAction::ResetCamera => {
                if let Some(viewport) = self.viewport.as_mut() {
                    viewport.reset_camera(self.world.camera());
                }
            }
            MenuAction::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }
    }

    fn elements_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("elements_panel")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Elements");
                ui.separator();

                let mut clicked = None;
                egui::ScrollArea::vertical()
                    .max_height(ui.available_height() * 0.4)
                    .show(ui, |ui| {
                        for element in self.world.elements() {
                            let label = format!("{}  {}", element.kind().tag(), element.name());
                            let selected = self.selected == Some(element.id());
                            if ui.selectable_label(selected, label).clicked() {
                                clicked = Some(element.id());
                            }
                        }
                    });
                if let Some(id) = clicked {
                    self.select(id);
                }

                ui.separator();
                self.properties_ui(ui);

                ui.separator();
                self.rendering_ui(ui);
            });
    }

    fn properties_ui(&mut self, ui: &mut egui::Ui) {
        let Some(id) = self.selected else {
            ui.label("No element selected");
            return;
        };
        let Some(element) = self.world.element(id) else {
            self.selected = None;
            self.edits.clear();
            return;
        };

        ui.heading(element.name());
        ui.label(element.kind().tag());
        if self.edits.is_empty() {
            ui.label("No editable attributes");
            return;
        }

        let mut commit = None;
        egui::Grid::new("attributes")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                for (name, value) in &mut self.edits {
                    ui.label(*name);
                    let response = ui.text_edit_singleline(value);
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        commit = Some((*name, value.clone()));
                    }
                    ui.end_row();
                }
            });

        ui.horizontal(|ui| {
            if ui.button("Refresh").clicked() {
                self.refresh_edits();
            }
            if ui.button("Remove").clicked() {
                match self.world.detach(id) {
                    Ok(()) => {
                        self.selected = None;
                        self.edits.clear();
                    }
                    Err(e) => self.status = Some(e.to_string()),
                }
            }
        });

        if let Some((name, value)) = commit {
            self.status = Some(match self.world.update_attribute(id, name, &value) {
                Ok(()) => format!("{} = {}", name, value),
                Err(e) => e.to_string(),
            });
            self.refresh_edits();
        }
    }

    fn rendering_ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("Rendering");

        if let Some(viewport) = self.viewport.as_mut() {
            let mut bloom = viewport.is_bloom_enabled();
            if ui.checkbox(&mut bloom, "Bloom").changed() {
                viewport.set_bloom_enabled(bloom);
            }
        }

        ui.horizontal(|ui| {
            let clock = self.world.clock_mut();
            ui.label(format!("t = {:.1} s", clock.elapsed()));
            if clock.is_paused() {
                if ui.button("Resume").clicked() {
                    clock.resume();
                }
            } else if ui.button("Pause").clicked() {
                clock.pause();
            }
        });
    }

    fn status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match &self.scene_path {
                    Some(path) => ui.label(path.display().to_string()),
                    None => ui.label("No scene"),
                };
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(status);
                }
                if let Some(viewport) = &self.viewport {
                    ui.separator();
                    ui.label(format!("distance {:.0}", viewport.controls().distance()));
                }
                if self.dropped_frames > 0 {
                    ui.separator();
                    ui.colored_label(
                        egui::Color32::YELLOW,
                        format!("{} dropped frames", self.dropped_frames),
                    );
                }
            });
        });
    }

    fn viewport_ui(&mut self, ctx: &egui::Context, frame: &eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let (rect, response) =
                    ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

                let (Some(viewport), Some(render_state)) =
                    (self.viewport.as_mut(), frame.wgpu_render_state())
                else {
                    ui.painter().text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        "No GPU viewport",
                        egui::FontId::proportional(16.0),
                        egui::Color32::GRAY,
                    );
                    return;
                };

                let pixels_per_point = ctx.pixels_per_point();
                let width = (rect.width() * pixels_per_point).round() as u32;
                let height = (rect.height() * pixels_per_point).round() as u32;
                let texture_id = {
                    let mut egui_renderer = render_state.renderer.write();
                    viewport.ensure_texture(width, height, &mut egui_renderer)
                };

                let drag = response.drag_delta() * pixels_per_point;
                let scroll = if response.hovered() {
                    ui.input(|i| i.smooth_scroll_delta.y)
                } else {
                    0.0
                };
                viewport.handle_input(Vec2::new(drag.x, drag.y), scroll);

                self.world.tick();
                if let Err(e) = viewport.render(&mut self.world) {
                    self.dropped_frames += 1;
                    tracing::warn!("Dropped frame: {}", e);
                }

                ui.painter().image(
                    texture_id,
                    rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            });
    }
}

impl eframe::App for OrreryApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        if let Some(action) = self.menu_bar(ctx) {
            self.handle_menu_action(ctx, action);
        }
        self.status_bar(ctx);
        if self.show_elements_panel {
            self.elements_panel(ctx);
        }
        self.viewport_ui(ctx, frame);

        // Motion is clock driven, so keep frames coming
        ctx.request_repaint();
    }
}
