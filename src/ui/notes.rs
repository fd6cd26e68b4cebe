use iced::widget::image::Handle;
use iced::widget::{button, column, container, image, row, scrollable, text, text_input, Column};
use iced::{ContentFit, Element, Length};

use super::{detail_header, empty_state, local_datetime, local_time, location_label};
use crate::app::Message;
use crate::state::data::{Artifact, Note};

pub fn view<'a>(
    artifact: &'a Artifact,
    notes: &'a [Note],
    picture: Option<&'a Handle>,
    draft: &'a str,
) -> Element<'a, Message> {
    let mut summary = column![].spacing(6);
    if let Some(picture) = picture {
        summary = summary.push(
            image(picture.clone())
                .width(Length::Fill)
                .height(Length::Fixed(160.0))
                .content_fit(ContentFit::Cover),
        );
    }
    summary = summary
        .push(text(format!("📍 {}", location_label(artifact, "Location unknown"))).size(13))
        .push(text(local_datetime(&artifact.timestamp)).size(12));

    let thread: Element<Message> = if notes.is_empty() {
        empty_state("No messages yet", "Share your thoughts about this artifact")
    } else {
        Column::with_children(notes.iter().map(note))
            .spacing(10)
            .into()
    };

    let composer = row![
        text_input("Add a note or observation...", draft)
            .on_input(Message::DraftChanged)
            .on_submit(Message::SendNote)
            .padding(10)
            .width(Length::Fill),
        button(text("Send"))
            .on_press_maybe((!draft.trim().is_empty()).then_some(Message::SendNote))
            .padding([10, 20]),
    ]
    .spacing(8)
    .padding(12);

    column![
        detail_header(format!("💬 {}", artifact.name)),
        scrollable(
            column![
                container(summary)
                    .padding(12)
                    .width(Length::Fill)
                    .style(container::rounded_box),
                thread,
            ]
            .spacing(12)
            .padding(16),
        )
        .height(Length::Fill),
        composer,
    ]
    .into()
}

fn note(note: &Note) -> Element<'_, Message> {
    container(
        column![
            row![
                text(&note.user).size(14).width(Length::Fill),
                text(local_time(&note.timestamp)).size(12),
            ],
            text(&note.text),
        ]
        .spacing(4),
    )
    .padding(10)
    .width(Length::Fill)
    .style(container::rounded_box)
    .into()
}
