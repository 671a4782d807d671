use serde::{Deserialize, Serialize};

/// Slides geometry is in EMU; frames are authored in pixels.
pub const EMU_PER_PIXEL: i64 = 9525;

/// Every text box in a guide uses this family.
pub const GUIDE_FONT_FAMILY: &str = "Nunito";

/// One entry of a `presentations.batchUpdate` request list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    CreateSlide(CreateSlide),
    DeleteObject(DeleteObject),
    UpdatePageProperties(UpdatePageProperties),
    CreateShape(CreateShape),
    InsertText(InsertText),
    UpdateTextStyle(UpdateTextStyle),
    CreateVideo(CreateVideo),
    UpdateVideoProperties(UpdateVideoProperties),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlide {
    pub slide_layout_reference: LayoutReference,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReference {
    pub predefined_layout: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteObject {
    pub object_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageProperties {
    pub object_id: String,
    pub page_properties: PageProperties,
    pub fields: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageProperties {
    pub page_background_fill: PageBackgroundFill,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBackgroundFill {
    pub stretched_picture_fill: StretchedPictureFill,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StretchedPictureFill {
    pub content_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShape {
    pub object_id: String,
    pub shape_type: String,
    pub element_properties: ElementProperties,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertText {
    pub object_id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTextStyle {
    pub object_id: String,
    pub text_range: TextRange,
    pub style: TextStyle,
    pub fields: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextRange {
    #[serde(rename = "type")]
    pub kind: String,
}

impl TextRange {
    pub fn all() -> Self {
        Self {
            kind: "ALL".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideo {
    pub object_id: String,
    pub element_properties: ElementProperties,
    pub source: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideoProperties {
    pub object_id: String,
    pub video_properties: VideoProperties,
    pub fields: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoProperties {
    pub auto_play: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementProperties {
    pub page_object_id: String,
    pub size: Size,
    pub transform: AffineTransform,
}

#[derive(Debug, Clone, Serialize)]
pub struct Size {
    pub width: Dimension,
    pub height: Dimension,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dimension {
    pub magnitude: i64,
    pub unit: String,
}

impl Dimension {
    pub fn emu(magnitude: i64) -> Self {
        Self {
            magnitude,
            unit: "EMU".to_string(),
        }
    }

    pub fn pt(magnitude: i64) -> Self {
        Self {
            magnitude,
            unit: "PT".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffineTransform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub translate_x: i64,
    pub translate_y: i64,
    pub unit: String,
}

/// Size and offset of an element, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub width: i64,
    pub height: i64,
    pub x: i64,
    pub y: i64,
}

impl Frame {
    pub const fn new(width: i64, height: i64, x: i64, y: i64) -> Self {
        Self {
            width,
            height,
            x,
            y,
        }
    }

    pub fn element_properties(&self, page_id: &str) -> ElementProperties {
        ElementProperties {
            page_object_id: page_id.to_string(),
            size: Size {
                width: Dimension::emu(self.width * EMU_PER_PIXEL),
                height: Dimension::emu(self.height * EMU_PER_PIXEL),
            },
            transform: AffineTransform {
                scale_x: 1.0,
                scale_y: 1.0,
                translate_x: self.x * EMU_PER_PIXEL,
                translate_y: self.y * EMU_PER_PIXEL,
                unit: "EMU".to_string(),
            },
        }
    }
}

/// A text box placed on a page. An empty `link` means plain text.
#[derive(Debug, Clone)]
pub struct TextBox {
    pub short_name: String,
    pub text: String,
    pub link: Option<String>,
    pub font_size: i64,
    pub frame: Frame,
}

/// An embedded YouTube video.
#[derive(Debug, Clone)]
pub struct Video {
    pub short_name: String,
    pub video_id: String,
    pub frame: Frame,
}

impl Request {
    pub fn create_blank_slide() -> Self {
        Request::CreateSlide(CreateSlide {
            slide_layout_reference: LayoutReference {
                predefined_layout: "BLANK".to_string(),
            },
        })
    }

    pub fn delete_object(object_id: &str) -> Self {
        Request::DeleteObject(DeleteObject {
            object_id: object_id.to_string(),
        })
    }

    pub fn stretched_background(page_id: &str, content_url: &str) -> Self {
        Request::UpdatePageProperties(UpdatePageProperties {
            object_id: page_id.to_string(),
            page_properties: PageProperties {
                page_background_fill: PageBackgroundFill {
                    stretched_picture_fill: StretchedPictureFill {
                        content_url: content_url.to_string(),
                    },
                },
            },
            fields: "pageBackgroundFill".to_string(),
        })
    }
}

impl TextBox {
    /// Create, fill and style the box; a non-empty link adds one more style request.
    pub fn requests(&self, page_id: &str) -> Vec<Request> {
        let mut requests = vec![
            Request::CreateShape(CreateShape {
                object_id: self.short_name.clone(),
                shape_type: "TEXT_BOX".to_string(),
                element_properties: self.frame.element_properties(page_id),
            }),
            Request::InsertText(InsertText {
                object_id: self.short_name.clone(),
                text: self.text.clone(),
            }),
            Request::UpdateTextStyle(UpdateTextStyle {
                object_id: self.short_name.clone(),
                text_range: TextRange::all(),
                style: TextStyle {
                    font_family: Some(GUIDE_FONT_FAMILY.to_string()),
                    font_size: Some(Dimension::pt(self.font_size)),
                    link: None,
                },
                fields: "fontFamily,fontSize".to_string(),
            }),
        ];

        if let Some(url) = self.link.as_deref().filter(|url| !url.is_empty()) {
            requests.push(Request::UpdateTextStyle(UpdateTextStyle {
                object_id: self.short_name.clone(),
                text_range: TextRange::all(),
                style: TextStyle {
                    link: Some(Link {
                        url: url.to_string(),
                    }),
                    ..TextStyle::default()
                },
                fields: "link".to_string(),
            }));
        }

        requests
    }
}

impl Video {
    pub fn requests(&self, page_id: &str) -> Vec<Request> {
        vec![
            Request::CreateVideo(CreateVideo {
                object_id: self.short_name.clone(),
                element_properties: self.frame.element_properties(page_id),
                source: "YOUTUBE".to_string(),
                id: self.video_id.clone(),
            }),
            Request::UpdateVideoProperties(UpdateVideoProperties {
                object_id: self.short_name.clone(),
                video_properties: VideoProperties { auto_play: true },
                fields: "autoPlay".to_string(),
            }),
        ]
    }
}

#[derive(Debug, Serialize)]
pub struct BatchUpdateRequest<'a> {
    pub requests: &'a [Request],
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateResponse {
    #[serde(default)]
    pub replies: Vec<Reply>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub create_slide: Option<CreatedObject>,
    pub create_shape: Option<CreatedObject>,
    pub create_video: Option<CreatedObject>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedObject {
    pub object_id: String,
}

/// The subset of `presentations.get` the builder reads.
#[derive(Debug, Default, Deserialize)]
pub struct Presentation {
    #[serde(default)]
    pub slides: Vec<PageSummary>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub object_id: String,
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn wire(requests: &[Request]) -> Vec<Value> {
        requests
            .iter()
            .map(|r| serde_json::to_value(r).unwrap())
            .collect()
    }

    fn sample_box(link: Option<&str>) -> TextBox {
        TextBox {
            short_name: "font_1".to_string(),
            text: "Arial".to_string(),
            link: link.map(str::to_string),
            font_size: 16,
            frame: Frame::new(720, 50, 120, 180),
        }
    }

    #[test]
    fn text_box_wire_shape() {
        let requests = wire(&sample_box(None).requests("page-1"));
        assert_eq!(requests.len(), 3);
        assert_eq!(
            requests[0],
            json!({
                "createShape": {
                    "objectId": "font_1",
                    "shapeType": "TEXT_BOX",
                    "elementProperties": {
                        "pageObjectId": "page-1",
                        "size": {
                            "width": { "magnitude": 6858000, "unit": "EMU" },
                            "height": { "magnitude": 476250, "unit": "EMU" }
                        },
                        "transform": {
                            "scaleX": 1.0,
                            "scaleY": 1.0,
                            "translateX": 1143000,
                            "translateY": 1714500,
                            "unit": "EMU"
                        }
                    }
                }
            })
        );
        assert_eq!(
            requests[1],
            json!({ "insertText": { "objectId": "font_1", "text": "Arial" } })
        );
        assert_eq!(
            requests[2],
            json!({
                "updateTextStyle": {
                    "objectId": "font_1",
                    "textRange": { "type": "ALL" },
                    "style": {
                        "fontFamily": "Nunito",
                        "fontSize": { "magnitude": 16, "unit": "PT" }
                    },
                    "fields": "fontFamily,fontSize"
                }
            })
        );
    }

    #[test]
    fn empty_link_is_treated_as_plain_text() {
        assert_eq!(sample_box(Some("")).requests("p").len(), 3);
    }

    #[test]
    fn link_adds_exactly_one_style_request() {
        let requests = wire(&sample_box(Some("https://x")).requests("p"));
        assert_eq!(requests.len(), 4);
        assert_eq!(
            requests[3],
            json!({
                "updateTextStyle": {
                    "objectId": "font_1",
                    "textRange": { "type": "ALL" },
                    "style": { "link": { "url": "https://x" } },
                    "fields": "link"
                }
            })
        );
    }

    #[test]
    fn video_requests_share_object_id() {
        let video = Video {
            short_name: "obs_install".to_string(),
            video_id: "Gr4XgEt2eXM".to_string(),
            frame: Frame::new(600, 337, 180, 110),
        };
        let requests = wire(&video.requests("page-5"));
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0]["createVideo"]["objectId"], "obs_install");
        assert_eq!(requests[0]["createVideo"]["source"], "YOUTUBE");
        assert_eq!(requests[0]["createVideo"]["id"], "Gr4XgEt2eXM");
        assert_eq!(
            requests[1],
            json!({
                "updateVideoProperties": {
                    "objectId": "obs_install",
                    "videoProperties": { "autoPlay": true },
                    "fields": "autoPlay"
                }
            })
        );
    }

    #[test]
    fn background_request_wire_shape() {
        let request =
            serde_json::to_value(Request::stretched_background("s1", "https://img")).unwrap();
        assert_eq!(
            request,
            json!({
                "updatePageProperties": {
                    "objectId": "s1",
                    "pageProperties": {
                        "pageBackgroundFill": {
                            "stretchedPictureFill": { "contentUrl": "https://img" }
                        }
                    },
                    "fields": "pageBackgroundFill"
                }
            })
        );
    }

    #[test]
    fn replies_parse_sparse_objects() {
        let response: BatchUpdateResponse = serde_json::from_value(json!({
            "presentationId": "deck",
            "replies": [ { "createSlide": { "objectId": "g123" } }, {} ]
        }))
        .unwrap();
        assert_eq!(response.replies.len(), 2);
        assert_eq!(
            response.replies[0].create_slide.as_ref().unwrap().object_id,
            "g123"
        );
        assert!(response.replies[1].create_shape.is_none());
    }
}
