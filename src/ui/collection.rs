use iced::widget::{button, column, container, image, row, scrollable, text};
use iced::{Alignment, ContentFit, Element, Length};
use iced_aw::Wrap;

use super::thumbnail::ImageCache;
use super::{empty_state, local_datetime, location_label};
use crate::app::Message;
use crate::state::data::{Artifact, CollectionState};
use crate::state::screen::Transition;

const CARD_WIDTH: f32 = 280.0;

pub fn view<'a>(state: &'a CollectionState, images: &'a ImageCache) -> Element<'a, Message> {
    let mut title = row![text(format!("🗃 Collection ({})", state.artifacts.len()))
        .size(24)
        .width(Length::Fill)]
    .align_y(Alignment::Center);

    if !state.artifacts.is_empty() {
        title = title.push(
            button(text("Export").size(14))
                .on_press(Message::ExportBackup)
                .padding([6, 14]),
        );
    }

    let body: Element<Message> = if state.artifacts.is_empty() {
        empty_state("No artifacts yet", "Start scanning to build your collection")
    } else {
        let cards = state
            .artifacts
            .iter()
            .map(|artifact| card(artifact, images))
            .collect();

        scrollable(Wrap::with_elements(cards).spacing(16.0).line_spacing(16.0))
            .height(Length::Fill)
            .into()
    };

    column![title, body].spacing(16).padding(16).into()
}

fn card<'a>(artifact: &'a Artifact, images: &'a ImageCache) -> Element<'a, Message> {
    let picture: Element<Message> = match images.get(&artifact.id) {
        Some(thumbnail) => image(thumbnail.clone())
            .width(Length::Fill)
            .height(Length::Fixed(190.0))
            .content_fit(ContentFit::Cover)
            .into(),
        None => container(text("No preview"))
            .width(Length::Fill)
            .height(Length::Fixed(190.0))
            .center_x(Length::Fill)
            .center_y(Length::Fixed(190.0))
            .into(),
    };

    let action = |label: &'a str, message: Message| {
        button(container(text(label).size(13)).center_x(Length::Fill))
            .on_press(message)
            .width(Length::Fill)
            .padding(6)
    };

    let id = &artifact.id;

    let actions = column![
        row![
            action("💬 Notes", Message::Navigate(Transition::OpenNotes(id.clone()))),
            action("📍 Map", Message::Navigate(Transition::OpenMap(id.clone())))
                .style(button::success),
        ]
        .spacing(8),
        row![
            action("↗ Share", Message::ShareArtifact(id.clone())).style(button::secondary),
            action("🗑 Delete", Message::DeleteArtifact(id.clone())).style(button::danger),
        ]
        .spacing(8),
    ]
    .spacing(8);

    container(
        column![
            picture,
            text(&artifact.name).size(18),
            text(format!("📍 {}", location_label(artifact, "Location unavailable"))).size(13),
            text(local_datetime(&artifact.timestamp)).size(13),
            actions,
        ]
        .spacing(8),
    )
    .width(Length::Fixed(CARD_WIDTH))
    .padding(12)
    .style(container::rounded_box)
    .into()
}
