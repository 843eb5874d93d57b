use bytesize::ByteSize;
use iced::mouse::Cursor;
use iced::widget::canvas::{self, Canvas, Frame, Geometry, Program, Stroke, event};
use iced::widget::{button, center, column, container, opaque, row, stack, text};
use iced::{Color, Element, Font, Length, Point, Rectangle, Size, Task, Theme, mouse, window};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::gui_app::state::{Notification, Session, UiMode};
use crate::recognition::{RecognitionClient, RecognitionResult};
use crate::surface::{DrawingSurface, PointerEvent};

const APP_FONT: Font = Font::MONOSPACE;
const SURFACE_SIZE: f32 = 400.0;
const PREVIEW_SIZE: f32 = 180.0;

pub fn run_iced_app(client: RecognitionClient) -> iced::Result {
    iced::application("Digit Pad", DigitPadApp::update, DigitPadApp::view)
        .theme(DigitPadApp::theme)
        .window(window::Settings {
            size: Size::new(1040.0, 520.0),
            ..Default::default()
        })
        .default_font(APP_FONT)
        .run_with(move || DigitPadApp::new(client))
}

struct DigitPadApp {
    surface: DrawingSurface,
    surface_handle: iced::widget::image::Handle,
    session: Session,
    client: RecognitionClient,
    submitted_handle: Option<iced::widget::image::Handle>,
    result_handle: Option<iced::widget::image::Handle>,
    status_text: String,
}

#[derive(Debug, Clone)]
enum Message {
    Pointer(PointerEvent),
    ClearPressed,
    AnalyzePressed,
    UploadPressed,
    FilePicked(Option<PathBuf>),
    FileRead(Result<Vec<u8>, String>),
    AnalysisFinished(Result<RecognitionResult, String>),
    ResetPressed,
    DismissNotification,
}

impl DigitPadApp {
    fn new(client: RecognitionClient) -> (Self, Task<Message>) {
        let surface = DrawingSurface::new();
        let surface_handle = surface_to_handle(&surface);
        info!(endpoint = client.endpoint(), "drawing surface mounted");

        (
            DigitPadApp {
                surface,
                surface_handle,
                session: Session::new(),
                client,
                submitted_handle: None,
                result_handle: None,
                status_text: "Draw a digit or upload an image".to_string(),
            },
            Task::none(),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Pointer(event) => {
                if self.session.notification().is_some() {
                    return Task::none();
                }
                if self.surface.pointer(event) {
                    self.refresh_surface();
                }
                Task::none()
            }
            Message::ClearPressed => {
                self.surface.clear();
                self.refresh_surface();
                Task::none()
            }
            Message::AnalyzePressed => {
                if self.session.is_busy() {
                    return Task::none();
                }
                match self.surface.export_png() {
                    Ok(png) => self.submit(png),
                    Err(err) => {
                        self.session.report_failure(err.to_string());
                        Task::none()
                    }
                }
            }
            Message::UploadPressed => {
                if self.session.is_busy() {
                    return Task::none();
                }

                let dialog = rfd::AsyncFileDialog::new().pick_file();

                Task::perform(dialog, |result| {
                    Message::FilePicked(result.map(|file| file.path().to_path_buf()))
                })
            }
            Message::FilePicked(Some(path)) => {
                self.session.select_upload();
                self.status_text = format!("Reading {}", path.display());
                Task::perform(read_file_task(path), Message::FileRead)
            }
            Message::FilePicked(None) => Task::none(),
            Message::FileRead(Ok(bytes)) => self.submit(bytes),
            Message::FileRead(Err(error)) => {
                self.status_text = "Upload failed".to_string();
                self.session.report_failure(error);
                Task::none()
            }
            Message::AnalysisFinished(outcome) => {
                self.status_text = match &outcome {
                    Ok(result) => format!("Recognized {}", result.value),
                    Err(_) => "Analysis failed".to_string(),
                };
                self.session.finish_analysis(outcome);
                self.sync_previews();
                Task::none()
            }
            Message::ResetPressed => {
                self.session.reset();
                self.sync_previews();
                self.status_text = "Draw a digit or upload an image".to_string();
                Task::none()
            }
            Message::DismissNotification => {
                self.session.dismiss_notification();
                Task::none()
            }
        }
    }

    fn submit(&mut self, image: Vec<u8>) -> Task<Message> {
        self.status_text = format!("Analyzing {}", ByteSize::b(image.len() as u64));
        let image = self.session.begin_analysis(image);
        self.sync_previews();

        let client = self.client.clone();
        Task::perform(
            async move { client.analyze(image).await.map_err(|err| err.message()) },
            Message::AnalysisFinished,
        )
    }

    fn refresh_surface(&mut self) {
        self.surface_handle = surface_to_handle(&self.surface);
    }

    fn sync_previews(&mut self) {
        self.submitted_handle = self
            .session
            .submitted_image()
            .map(|bytes| iced::widget::image::Handle::from_bytes(bytes.to_vec()));
        self.result_handle = self
            .session
            .result_image()
            .map(|bytes| iced::widget::image::Handle::from_bytes(bytes.to_vec()));
        debug!(
            has_submitted = self.submitted_handle.is_some(),
            has_result = self.result_handle.is_some(),
            "previews refreshed"
        );
    }

    fn view(&self) -> Element<'_, Message> {
        let content = row![
            self.drawing_section(),
            self.controls_section(),
            self.result_section()
        ]
        .spacing(0)
        .height(Length::Fill);

        let base = container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_| container::Style {
                background: Some(Color::from_rgb8(32, 32, 32).into()),
                ..Default::default()
            });

        match self.session.notification() {
            Some(notification) => modal(base, notification_dialog(notification)),
            None => base.into(),
        }
    }

    fn drawing_section(&self) -> Element<'_, Message> {
        let bitmap = iced::widget::image(self.surface_handle.clone())
            .width(Length::Fixed(SURFACE_SIZE))
            .height(Length::Fixed(SURFACE_SIZE))
            .filter_method(iced::widget::image::FilterMethod::Nearest);

        let pointer_canvas = Canvas::new(PointerLayer)
            .width(Length::Fixed(SURFACE_SIZE))
            .height(Length::Fixed(SURFACE_SIZE));

        // Bitmap at the bottom, the event-capturing canvas on top
        let stacked = stack![bitmap, pointer_canvas];

        container(stacked)
            .padding(20)
            .height(Length::Fill)
            .style(|_| container::Style {
                background: Some(Color::from_rgb8(24, 24, 24).into()),
                ..Default::default()
            })
            .into()
    }

    fn controls_section(&self) -> Element<'_, Message> {
        let busy = self.session.is_busy();

        let analyze_button = button(text(if busy { "Analyzing..." } else { "Analyze" }))
            .on_press_maybe((!busy).then_some(Message::AnalyzePressed))
            .width(Length::Fill);
        let upload_button = button(text("Upload Image"))
            .on_press_maybe((!busy).then_some(Message::UploadPressed))
            .width(Length::Fill);
        let clear_button = button(text("Clear"))
            .on_press(Message::ClearPressed)
            .width(Length::Fill);
        let reset_button = button(text("Reset"))
            .on_press(Message::ResetPressed)
            .width(Length::Fill);

        let mode_label = match self.session.mode() {
            UiMode::None => "Mode: --",
            UiMode::Idle => "Mode: idle",
            UiMode::Analyzing => "Mode: analyzing",
        };

        let status = column![
            text(mode_label).size(14),
            text(&self.status_text).size(12)
        ]
        .spacing(8);

        let controls = column![
            analyze_button,
            upload_button,
            clear_button,
            reset_button
        ]
        .spacing(12)
        .width(Length::Fill);

        let all_controls = column![legend(" Controls ", controls), legend(" Status ", status)]
            .spacing(16)
            .width(Length::Fill);

        container(all_controls)
            .width(Length::Fixed(240.0))
            .padding(20)
            .into()
    }

    fn result_section(&self) -> Element<'_, Message> {
        let recognized: Element<'_, Message> = match self.session.recognized() {
            Some(value) => text(value).size(48).into(),
            None => text("No result yet").size(12).into(),
        };

        let previews = row![
            legend(" Submitted ", preview(self.submitted_handle.as_ref(), "Nothing submitted")),
            legend(" Annotated ", preview(self.result_handle.as_ref(), "No annotated image"))
        ]
        .spacing(16);

        let layout = column![legend(" Recognized ", recognized), previews]
            .spacing(16)
            .width(Length::Fill)
            .padding(20);

        container(layout).width(Length::Fill).into()
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn surface_to_handle(surface: &DrawingSurface) -> iced::widget::image::Handle {
    iced::widget::image::Handle::from_rgba(
        surface.width(),
        surface.height(),
        surface.pixels().as_raw().clone(),
    )
}

fn legend_style(_: &Theme) -> container::Style {
    container::Style {
        background: None,
        border: iced::border::Border {
            color: Color::from_rgb8(100, 100, 100),
            width: 1.0,
            radius: 4.0.into(),
        },
        ..Default::default()
    }
}

fn legend<'a>(title: &'a str, body: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    column![
        container(text(title).size(12)).style(|_| container::Style {
            background: Some(Color::from_rgb8(32, 32, 32).into()),
            ..Default::default()
        }),
        container(body).padding(10).width(Length::Fill).style(legend_style)
    ]
    .spacing(0)
    .into()
}

fn preview<'a>(
    handle: Option<&iced::widget::image::Handle>,
    placeholder: &'a str,
) -> Element<'a, Message> {
    match handle {
        Some(handle) => iced::widget::image(handle.clone())
            .width(Length::Fixed(PREVIEW_SIZE))
            .height(Length::Fixed(PREVIEW_SIZE))
            .content_fit(iced::ContentFit::Contain)
            .into(),
        None => container(text(placeholder).size(12))
            .width(Length::Fixed(PREVIEW_SIZE))
            .height(Length::Fixed(PREVIEW_SIZE))
            .padding(8)
            .into(),
    }
}

fn notification_dialog(notification: &Notification) -> Element<'_, Message> {
    container(
        column![
            text(&notification.title).size(18),
            text(&notification.message).size(14),
            button(text("Close")).on_press(Message::DismissNotification)
        ]
        .spacing(12),
    )
    .width(Length::Fixed(400.0))
    .padding(20)
    .style(|_| container::Style {
        background: Some(Color::from_rgb8(40, 40, 40).into()),
        border: iced::border::Border {
            color: Color::from_rgb8(170, 60, 60),
            width: 1.0,
            radius: 4.0.into(),
        },
        ..Default::default()
    })
    .into()
}

// Blocks everything underneath until the dialog's own button dismisses it.
fn modal<'a>(
    base: impl Into<Element<'a, Message>>,
    dialog: impl Into<Element<'a, Message>>,
) -> Element<'a, Message> {
    stack![
        base.into(),
        opaque(center(opaque(dialog)).style(|_| container::Style {
            background: Some(
                Color {
                    a: 0.7,
                    ..Color::BLACK
                }
                .into()
            ),
            ..Default::default()
        }))
    ]
    .into()
}

#[derive(Default)]
struct PointerState {
    inside: bool,
}

// Transparent layer over the bitmap: turns canvas mouse events into
// surface pointer events and draws only the frame border.
struct PointerLayer;

impl Program<Message> for PointerLayer {
    type State = PointerState;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let border = Stroke::default()
            .with_width(1.0)
            .with_color(Color::from_rgb8(70, 70, 70));
        frame.stroke_rectangle(Point::ORIGIN, bounds.size(), border);
        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (event::Status, Option<Message>) {
        let canvas::Event::Mouse(mouse_event) = event else {
            return (event::Status::Ignored, None);
        };

        match mouse_event {
            mouse::Event::ButtonPressed(mouse::Button::Left) => match cursor.position_in(bounds) {
                Some(position) => {
                    state.inside = true;
                    (
                        event::Status::Captured,
                        Some(Message::Pointer(PointerEvent::Down {
                            x: position.x,
                            y: position.y,
                        })),
                    )
                }
                None => (event::Status::Ignored, None),
            },
            mouse::Event::ButtonReleased(mouse::Button::Left) => {
                if state.inside {
                    (event::Status::Captured, Some(Message::Pointer(PointerEvent::Up)))
                } else {
                    (event::Status::Ignored, None)
                }
            }
            mouse::Event::CursorMoved { .. } => match cursor.position_in(bounds) {
                Some(position) => {
                    state.inside = true;
                    (
                        event::Status::Captured,
                        Some(Message::Pointer(PointerEvent::Move {
                            x: position.x,
                            y: position.y,
                        })),
                    )
                }
                None if state.inside => {
                    state.inside = false;
                    (event::Status::Captured, Some(Message::Pointer(PointerEvent::Leave)))
                }
                None => (event::Status::Ignored, None),
            },
            mouse::Event::CursorLeft => {
                state.inside = false;
                (event::Status::Captured, Some(Message::Pointer(PointerEvent::Leave)))
            }
            _ => (event::Status::Ignored, None),
        }
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

async fn read_file_task(path: PathBuf) -> Result<Vec<u8>, String> {
    tokio::fs::read(&path)
        .await
        .map_err(|err| format!("Failed to read {}: {err}", path.display()))
}
