use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::api::{DeckEditor, FileStore, ObjectStore};
use crate::models::drive::{CreateFileRequest, FileKind};
use crate::models::slides::{Request, TextBox, Video};

/// Staged images are only readable through a URL this short-lived.
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No presentation has been created in this session")]
    NoPresentation,
    #[error("Batch update reply carried no {0} object id")]
    MissingReply(&'static str),
}

/// What a page is for; content is placed by role, not by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRole {
    Image,
    Fonts,
    ObsInstall,
    SlobsInstall,
    StingerObs,
    StingerSlobs,
    Alerts,
}

impl PageRole {
    /// Parse the `@tag` an image file name may carry.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "image" => Some(PageRole::Image),
            "fonts" => Some(PageRole::Fonts),
            "obs-install" => Some(PageRole::ObsInstall),
            "slobs-install" => Some(PageRole::SlobsInstall),
            "stinger-obs" => Some(PageRole::StingerObs),
            "stinger-slobs" => Some(PageRole::StingerSlobs),
            "alerts" => Some(PageRole::Alerts),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub id: String,
    pub role: PageRole,
}

/// Bounded retry policy for lookup-by-name.
#[derive(Debug, Clone, Copy)]
pub struct LookupPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for LookupPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_secs(2),
        }
    }
}

/// The service handles plus everything learned while building one guide.
pub struct Session<F, D, O> {
    files: F,
    deck: D,
    objects: O,
    lookup: LookupPolicy,
    presentation_id: Option<String>,
    pages: Vec<Page>,
}

impl<F, D, O> Session<F, D, O>
where
    F: FileStore,
    D: DeckEditor,
    O: ObjectStore,
{
    pub fn new(files: F, deck: D, objects: O, lookup: LookupPolicy) -> Self {
        Self {
            files,
            deck,
            objects,
            lookup,
            presentation_id: None,
            pages: Vec::new(),
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// First page created with `role`, if any.
    pub fn page_for(&self, role: PageRole) -> Option<&str> {
        self.pages
            .iter()
            .find(|p| p.role == role)
            .map(|p| p.id.as_str())
    }

    pub fn presentation_id(&self) -> Result<&str> {
        Ok(self
            .presentation_id
            .as_deref()
            .ok_or(SessionError::NoPresentation)?)
    }

    /// Id of the first listed item named exactly `name`, or `None` once the attempts run out.
    pub async fn find_id_by_name(&self, query: &str, name: &str) -> Result<Option<String>> {
        let attempts = self.lookup.attempts.max(1);

        for attempt in 1..=attempts {
            log::debug!("Lookup '{}' attempt {}/{}: {}", name, attempt, attempts, query);
            let mut page_token: Option<String> = None;

            loop {
                let list = self.files.list_files(query, page_token.as_deref()).await?;
                if let Some(file) = list.files.into_iter().find(|f| f.name == name) {
                    return Ok(Some(file.id));
                }
                match list.next_page_token {
                    Some(token) => page_token = Some(token),
                    None => break,
                }
            }

            if attempt < attempts {
                log::info!("'{}' not listed yet, retrying...", name);
                tokio::time::sleep(self.lookup.delay).await;
            }
        }

        Ok(None)
    }

    pub async fn create_in_parent(
        &self,
        parent_id: &str,
        name: &str,
        kind: FileKind,
    ) -> Result<String> {
        let request = CreateFileRequest::in_parent(parent_id, name, kind);
        let file = self.files.create_file(&request).await?;
        log::info!("Created {:?} '{}' with ID {}", kind, name, file.id);
        Ok(file.id)
    }

    /// Create the guide's presentation and remember its id for later page calls.
    pub async fn create_presentation(&mut self, parent_id: &str, name: &str) -> Result<String> {
        let id = self
            .create_in_parent(parent_id, name, FileKind::Presentation)
            .await?;
        self.presentation_id = Some(id.clone());
        Ok(id)
    }

    /// Remove the slide the platform adds to every new presentation.
    pub async fn delete_first_page(&self) -> Result<Option<String>> {
        let presentation_id = self.presentation_id()?;
        let presentation = self.deck.get_presentation(presentation_id).await?;

        let Some(first) = presentation.slides.into_iter().next() else {
            log::warn!("Presentation {} has no slides to delete", presentation_id);
            return Ok(None);
        };

        self.deck
            .batch_update(presentation_id, &[Request::delete_object(&first.object_id)])
            .await
            .context("Failed to delete the first slide")?;
        Ok(Some(first.object_id))
    }

    pub async fn add_page(&mut self, role: PageRole) -> Result<String> {
        let presentation_id = self.presentation_id()?;
        let response = self
            .deck
            .batch_update(presentation_id, &[Request::create_blank_slide()])
            .await?;

        let id = response
            .replies
            .into_iter()
            .next()
            .and_then(|r| r.create_slide)
            .ok_or(SessionError::MissingReply("createSlide"))?
            .object_id;

        self.pages.push(Page {
            id: id.clone(),
            role,
        });
        Ok(id)
    }

    /// Create a page whose background is the image at `path`.
    ///
    /// The image is staged under its file name, referenced through a signed
    /// URL, and deleted again whether or not the background could be set.
    pub async fn add_image_page(&mut self, role: PageRole, path: &Path) -> Result<String> {
        let object_name = path
            .file_name()
            .context("Image path has no file name")?
            .to_string_lossy()
            .to_string();

        let page_id = self.add_page(role).await?;

        self.objects.upload_object(&object_name, path).await?;
        log::info!("Staged {}", object_name);

        let filled = async {
            let url = self.objects.signed_url(&object_name, SIGNED_URL_TTL)?;
            self.deck
                .batch_update(
                    self.presentation_id()?,
                    &[Request::stretched_background(&page_id, &url)],
                )
                .await
                .with_context(|| format!("Failed to set background of page {}", page_id))?;
            Ok::<_, anyhow::Error>(())
        }
        .await;

        // The staged copy goes whether or not the background was set.
        let removed = self.objects.delete_object(&object_name).await;
        filled?;
        removed?;
        log::info!("Removed staged {}", object_name);

        Ok(page_id)
    }

    pub async fn add_text(&self, page_id: &str, text_box: &TextBox) -> Result<String> {
        let response = self
            .deck
            .batch_update(self.presentation_id()?, &text_box.requests(page_id))
            .await?;

        let id = response
            .replies
            .into_iter()
            .next()
            .and_then(|r| r.create_shape)
            .ok_or(SessionError::MissingReply("createShape"))?
            .object_id;
        log::info!("Added text {}: {}", id, text_box.text);
        Ok(id)
    }

    pub async fn add_video(&self, page_id: &str, video: &Video) -> Result<String> {
        let response = self
            .deck
            .batch_update(self.presentation_id()?, &video.requests(page_id))
            .await?;

        let id = response
            .replies
            .into_iter()
            .next()
            .and_then(|r| r.create_video)
            .ok_or(SessionError::MissingReply("createVideo"))?
            .object_id;
        log::info!("Added video {} ({})", id, video.video_id);
        Ok(id)
    }
}


#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use super::fake::{Call, FakeWorkspace};
    use super::*;
    use crate::models::slides::Frame;

    fn quick() -> LookupPolicy {
        LookupPolicy {
            attempts: 3,
            delay: Duration::ZERO,
        }
    }

    fn session(fake: &FakeWorkspace) -> Session<&FakeWorkspace, &FakeWorkspace, &FakeWorkspace> {
        Session::new(fake, fake, fake, quick())
    }

    #[tokio::test]
    async fn lookup_returns_exact_match() {
        let fake = FakeWorkspace::new(&[&[("1", "Stream_Guides_old"), ("2", "Stream_Guides")]]);
        let found = session(&fake)
            .find_id_by_name("q", "Stream_Guides")
            .await
            .unwrap();
        assert_eq!(found.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn lookup_follows_page_tokens() {
        let fake = FakeWorkspace::new(&[&[("1", "a")], &[("2", "b")], &[("3", "target")]]);
        let found = session(&fake).find_id_by_name("q", "target").await.unwrap();
        assert_eq!(found.as_deref(), Some("3"));
        assert_eq!(
            fake.calls()[2],
            Call::List {
                query: "q".to_string(),
                page_token: Some("2".to_string())
            }
        );
    }

    #[tokio::test]
    async fn lookup_gives_up_after_bounded_attempts() {
        let fake = FakeWorkspace::new(&[&[("1", "other")]]);
        let found = session(&fake).find_id_by_name("q", "missing").await.unwrap();
        assert!(found.is_none());
        assert_eq!(fake.calls().len(), 3);
    }

    #[tokio::test]
    async fn presentation_id_comes_from_create_reply() {
        let fake = FakeWorkspace::new(&[]);
        let mut session = session(&fake);
        assert!(session.presentation_id().is_err());

        let id = session.create_presentation("folder-9", "Guide").await.unwrap();
        assert_eq!(session.presentation_id().unwrap(), id);
        assert_eq!(
            fake.calls(),
            vec![Call::Create {
                name: "Guide".to_string(),
                mime_type: "application/vnd.google-apps.presentation".to_string(),
                parent: "folder-9".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn first_page_is_deleted_by_its_listed_id() {
        let fake = FakeWorkspace::new(&[]);
        let mut session = session(&fake);
        session.create_presentation("f", "Guide").await.unwrap();

        let deleted = session.delete_first_page().await.unwrap();
        assert_eq!(deleted.as_deref(), Some("p"));
        assert_eq!(
            fake.requests(),
            vec![json!({ "deleteObject": { "objectId": "p" } })]
        );
    }

    #[tokio::test]
    async fn image_page_is_staged_then_cleaned() {
        let fake = FakeWorkspace::new(&[]);
        let mut session = session(&fake);
        session.create_presentation("f", "Guide").await.unwrap();

        let page = session
            .add_image_page(PageRole::Fonts, &PathBuf::from("/imgs/04.png"))
            .await
            .unwrap();

        assert_eq!(session.page_for(PageRole::Fonts), Some(page.as_str()));
        assert!(fake.staged().is_empty());

        let backgrounds = fake.requests_of("updatePageProperties");
        assert_eq!(backgrounds.len(), 1);
        assert_eq!(backgrounds[0]["objectId"], page.as_str());
        assert_eq!(
            backgrounds[0]["pageProperties"]["pageBackgroundFill"]["stretchedPictureFill"]
                ["contentUrl"],
            "https://signed.example/04.png?ttl=60"
        );
    }

    #[tokio::test]
    async fn empty_presentation_sends_no_delete() {
        let fake = FakeWorkspace::new(&[]).without_slides();
        let mut session = session(&fake);
        session.create_presentation("f", "Guide").await.unwrap();

        let deleted = session.delete_first_page().await.unwrap();
        assert!(deleted.is_none());
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn reply_without_created_id_is_an_error() {
        let fake = FakeWorkspace::new(&[]).without_replies();
        let mut session = session(&fake);
        session.create_presentation("f", "Guide").await.unwrap();

        let err = session.add_page(PageRole::Image).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SessionError>(),
            Some(SessionError::MissingReply("createSlide"))
        ));
        assert!(session.pages().is_empty());

        let video = Video {
            short_name: "obs_install".to_string(),
            video_id: "Gr4XgEt2eXM".to_string(),
            frame: Frame::new(600, 337, 180, 110),
        };
        let err = session.add_video("slide-x", &video).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SessionError>(),
            Some(SessionError::MissingReply("createVideo"))
        ));
    }

    #[tokio::test]
    async fn staged_image_is_removed_when_background_fails() {
        let fake = FakeWorkspace::new(&[]).rejecting("updatePageProperties");
        let mut session = session(&fake);
        session.create_presentation("f", "Guide").await.unwrap();

        let err = session
            .add_image_page(PageRole::Image, &PathBuf::from("/imgs/a.png"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to set background"));
        assert!(fake.staged().is_empty());
        assert_eq!(
            fake.calls().last(),
            Some(&Call::Delete {
                name: "a.png".to_string()
            })
        );
    }

    #[tokio::test]
    async fn text_without_link_sends_three_requests() {
        let fake = FakeWorkspace::new(&[]);
        let mut session = session(&fake);
        session.create_presentation("f", "Guide").await.unwrap();

        let text = TextBox {
            short_name: "note".to_string(),
            text: "hello".to_string(),
            link: None,
            font_size: 18,
            frame: Frame::new(720, 50, 120, 110),
        };
        let id = session.add_text("slide-x", &text).await.unwrap();

        assert_eq!(id, "note");
        assert_eq!(fake.requests().len(), 3);
        assert!(
            fake.requests_of("updateTextStyle")
                .iter()
                .all(|s| s["style"].get("link").is_none())
        );
    }

    #[tokio::test]
    async fn text_with_link_sends_one_link_request() {
        let fake = FakeWorkspace::new(&[]);
        let mut session = session(&fake);
        session.create_presentation("f", "Guide").await.unwrap();

        let text = TextBox {
            short_name: "link".to_string(),
            text: "docs".to_string(),
            link: Some("https://example.com".to_string()),
            font_size: 18,
            frame: Frame::new(720, 50, 120, 180),
        };
        session.add_text("slide-x", &text).await.unwrap();

        let links: Vec<_> = fake
            .requests_of("updateTextStyle")
            .into_iter()
            .filter(|s| s["fields"] == "link")
            .collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0]["style"]["link"]["url"], "https://example.com");
    }

    #[tokio::test]
    async fn video_sends_create_then_autoplay() {
        let fake = FakeWorkspace::new(&[]);
        let mut session = session(&fake);
        session.create_presentation("f", "Guide").await.unwrap();

        let video = Video {
            short_name: "obs_install".to_string(),
            video_id: "Gr4XgEt2eXM".to_string(),
            frame: Frame::new(600, 337, 180, 110),
        };
        let id = session.add_video("slide-x", &video).await.unwrap();

        let requests = fake.requests();
        assert_eq!(id, "obs_install");
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0]["createVideo"]["objectId"], "obs_install");
        assert_eq!(requests[1]["updateVideoProperties"]["objectId"], "obs_install");
        assert_eq!(
            requests[1]["updateVideoProperties"]["videoProperties"]["autoPlay"],
            true
        );
    }

    #[test]
    fn role_tags_parse() {
        assert_eq!(PageRole::from_tag("Fonts"), Some(PageRole::Fonts));
        assert_eq!(PageRole::from_tag("stinger-slobs"), Some(PageRole::StingerSlobs));
        assert_eq!(PageRole::from_tag("cover"), None);
    }
}
