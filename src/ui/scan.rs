use iced::widget::image::Handle;
use iced::widget::{button, column, container, image, row, text, Column};
use iced::{Alignment, ContentFit, Element, Length};

use crate::app::Message;

/// What the scan screen needs from the app
pub struct ScanView<'a> {
    pub camera_active: bool,
    pub preview: Option<&'a Handle>,
    pub has_artifacts: bool,
    /// A capture is being encoded or located
    pub capturing: bool,
}

pub fn view(scan: ScanView<'_>) -> Element<'_, Message> {
    let content: Element<Message> = if scan.camera_active {
        camera_panel(&scan)
    } else {
        start_panel(&scan)
    };

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .padding(16)
        .into()
}

/// Live preview with capture and cancel
fn camera_panel<'a>(scan: &ScanView<'a>) -> Element<'a, Message> {
    let preview: Element<Message> = match scan.preview {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .content_fit(ContentFit::Contain)
            .into(),
        None => container(text("Waiting for camera..."))
            .width(Length::Fill)
            .height(Length::Fixed(320.0))
            .center_x(Length::Fill)
            .center_y(Length::Fixed(320.0))
            .into(),
    };

    column![
        container(preview).style(container::dark).width(Length::Fill),
        row![
            button(text("Capture Photo"))
                .on_press_maybe((!scan.capturing).then_some(Message::CapturePhoto))
                .width(Length::Fill)
                .padding(12),
            button(text("Cancel"))
                .on_press(Message::StopCamera)
                .style(button::secondary)
                .padding(12),
        ]
        .spacing(12),
    ]
    .spacing(16)
    .max_width(720)
    .into()
}

/// Camera and upload entry points
fn start_panel<'a>(scan: &ScanView<'a>) -> Element<'a, Message> {
    let idle = !scan.capturing;

    let mut panel: Column<Message> = column![
        text("📷").size(72),
        text("Scan Artifact").size(32),
        text("Capture or upload a photo to document and track your archaeological finds")
            .size(15),
        button(container(text("Open Camera")).center_x(Length::Fill))
            .on_press_maybe(idle.then_some(Message::StartCamera))
            .width(Length::Fill)
            .padding(12),
        button(container(text("Upload Photo")).center_x(Length::Fill))
            .on_press_maybe(idle.then_some(Message::UploadPhoto))
            .style(button::secondary)
            .width(Length::Fill)
            .padding(12),
    ]
    .spacing(14)
    .max_width(420)
    .align_x(Alignment::Center);

    if scan.has_artifacts {
        panel = panel.push(
            button(container(text("Export Backup").size(14)).center_x(Length::Fill))
                .on_press(Message::ExportBackup)
                .style(button::text)
                .width(Length::Fill),
        );
    }

    panel = panel.push(
        button(container(text("Import Backup").size(14)).center_x(Length::Fill))
            .on_press(Message::ImportBackup)
            .style(button::text)
            .width(Length::Fill),
    );

    container(panel)
        .padding(28)
        .style(container::rounded_box)
        .into()
}
