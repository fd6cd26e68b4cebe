use iced::widget::image::Handle;
use iced::widget::{button, column, container, image, scrollable, text};
use iced::{ContentFit, Element, Font, Length};

use super::{detail_header, empty_state, local_datetime};
use crate::app::Message;
use crate::state::data::{Artifact, GeoLocation};

pub fn view<'a>(artifact: &'a Artifact, picture: Option<&'a Handle>) -> Element<'a, Message> {
    let body: Element<Message> = match artifact.location {
        Some(location) => details(artifact, location, picture),
        None => empty_state(
            "Location Unavailable",
            "GPS data was not captured for this artifact",
        ),
    };

    column![
        detail_header("📍 Location Details".to_string()),
        scrollable(container(body).width(Length::Fill).center_x(Length::Fill).padding(16)),
    ]
    .into()
}

fn details<'a>(
    artifact: &'a Artifact,
    location: GeoLocation,
    picture: Option<&'a Handle>,
) -> Element<'a, Message> {
    let mut content = column![].spacing(12).max_width(720);

    if let Some(picture) = picture {
        content = content.push(
            image(picture.clone())
                .width(Length::Fill)
                .height(Length::Fixed(260.0))
                .content_fit(ContentFit::Cover),
        );
    }

    let mut coordinates = column![
        text("🧭 GPS Coordinates").size(18),
        text(format!("Latitude: {:.6}°", location.lat)).font(Font::MONOSPACE),
        text(format!("Longitude: {:.6}°", location.lng)).font(Font::MONOSPACE),
    ]
    .spacing(6);

    if let Some(accuracy) = accuracy_label(&location) {
        coordinates = coordinates.push(text(accuracy).font(Font::MONOSPACE));
    }

    content
        .push(text(&artifact.name).size(26))
        .push(text(format!("Discovered: {}", local_datetime(&artifact.timestamp))).size(14))
        .push(
            container(coordinates)
                .padding(16)
                .width(Length::Fill)
                .style(container::rounded_box),
        )
        .push(
            button(container(text("Open in Google Maps →")).center_x(Length::Fill))
                .on_press(Message::CopyMapLink(location.maps_url()))
                .style(button::success)
                .width(Length::Fill)
                .padding(12),
        )
        .push(text("The link is copied to the clipboard").size(12))
        .into()
}

/// `Accuracy: ±<m>m`, hidden when no usable accuracy was reported
fn accuracy_label(location: &GeoLocation) -> Option<String> {
    location
        .accuracy
        .filter(|a| *a > 0.0)
        .map(|a| format!("Accuracy: ±{:.0}m", a))
}
