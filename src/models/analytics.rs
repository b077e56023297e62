use serde::Serialize;
use std::collections::HashMap;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Click,
    Scroll,
    Hover,
    KeyPress,
    GoBack,
    GoForward,
    GoToUrl,
    Custom,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinates {
    pub x: f32,
    pub y: f32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum LogPayload {
    Click {
        text: String,
        page_url: String,
        element_identifier: String,
        coordinates: Coordinates,
    },
    KeyPress {
        text: String,
        page_url: String,
        element_identifier: String,
        key: String,
    },
    Hover {
        text: String,
        page_url: String,
        element_identifier: String,
    },
    Scroll {
        text: String,
        page_url: String,
        scroll_x: f32,
        scroll_y: f32,
    },
    GoToUrl {
        text: String,
        page_url: String,
        target_url: String,
    },
    Custom {
        text: String,
        custom_action: String,
        data: HashMap<String, serde_json::Value>,
    },
    // go_back / go_forward
    Navigation {
        text: String,
        page_url: String,
    },
}

impl LogPayload {
    pub fn click(
        page_url: String,
        element_id: &str,
        text: &str,
        coordinates: Option<Coordinates>,
    ) -> Self {
        LogPayload::Click {
            text: text.to_owned(),
            page_url,
            element_identifier: element_id.to_owned(),
            coordinates: coordinates.unwrap_or_default(),
        }
    }

    pub fn key_press(page_url: String, element_id: &str, text: &str, key: &str) -> Self {
        LogPayload::KeyPress {
            text: text.to_owned(),
            page_url,
            element_identifier: element_id.to_owned(),
            key: key.to_owned(),
        }
    }

    pub fn hover(page_url: String, element_id: &str, text: &str) -> Self {
        LogPayload::Hover {
            text: text.to_owned(),
            page_url,
            element_identifier: element_id.to_owned(),
        }
    }

    pub fn scroll(page_url: String, text: &str, scroll_x: f32, scroll_y: f32) -> Self {
        LogPayload::Scroll {
            text: text.to_owned(),
            page_url,
            scroll_x,
            scroll_y,
        }
    }

    pub fn go_to_url(page_url: String, text: &str, target_url: &str) -> Self {
        LogPayload::GoToUrl {
            text: text.to_owned(),
            page_url,
            target_url: target_url.to_owned(),
        }
    }

    pub fn navigation(page_url: String, text: &str) -> Self {
        LogPayload::Navigation {
            text: text.to_owned(),
            page_url,
        }
    }

    pub fn custom(
        custom_action: &str,
        text: &str,
        data: HashMap<String, serde_json::Value>,
    ) -> Self {
        LogPayload::Custom {
            text: text.to_owned(),
            custom_action: custom_action.to_owned(),
            data,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct LogEventRequest<'a> {
    #[serde(rename = "actionType")]
    pub action_type: ActionType,
    pub payload: &'a LogPayload,
}
