use crate::bus::{BusMessage, COLLECTION_RESPONSE, GET_COLLECTION, GET_NEW_WALLPAPER, REGISTER_PROVIDER, SET_WALLPAPER};
use crate::error::SourceError;
use crate::skill::{WallpaperSkill, SKILL_NAME};
use crate::Result;
use serde_json::json;

pub const PROVIDER_NAME: &str = "wallpapers";

#[derive(Debug, Clone)]
pub struct Provider {
    name: String,
    display_name: String,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new(PROVIDER_NAME, SKILL_NAME)
    }
}

impl Provider {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
        }
    }

    pub fn register(&self, skill: &WallpaperSkill) {
        log::info!("Registering wallpaper provider {}", self.name);
        skill.announce(
            REGISTER_PROVIDER,
            json!({
                "provider_name": self.name,
                "provider_display_name": self.display_name,
            }),
        );
    }

    /// Returns whether the message was one of ours.
    pub fn handle(&self, message: &BusMessage, skill: &mut WallpaperSkill) -> Result<bool> {
        match message.msg_type.as_str() {
            GET_COLLECTION => {
                let collection: Vec<String> = skill
                    .fresh_pictures()?
                    .into_iter()
                    .map(|record| record.image_url)
                    .collect();
                log::debug!("Answering collection request with {} wallpapers", collection.len());
                skill.announce(
                    COLLECTION_RESPONSE,
                    json!({
                        "provider_name": self.name,
                        "wallpaper_collection": collection,
                    }),
                );
                Ok(true)
            }
            GET_NEW_WALLPAPER => {
                let url = skill
                    .fresh_pictures()?
                    .into_iter()
                    .next()
                    .map(|record| record.image_url)
                    .ok_or(SourceError::Exhausted)?;
                skill.announce(
                    SET_WALLPAPER,
                    json!({
                        "provider_name": self.name,
                        "url": url,
                    }),
                );
                Ok(true)
            }
            other => {
                log::debug!("Ignoring bus message {}", other);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::IMAGE_KEY;
    use crate::selector::tests::FakeUpstream;
    use crate::skill::tests::{harness, settings};
    use crate::skill::Mode;
    use serde_json::Value;

    #[test]
    fn test_register_announces_names() {
        let h = harness(settings(&[]), FakeUpstream::default());
        Provider::default().register(&h.skill);

        let sent = h.outbox.drain();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].msg_type, REGISTER_PROVIDER);
        assert_eq!(sent[0].data["provider_name"], "wallpapers");
        assert_eq!(sent[0].data["provider_display_name"], "Wallpapers");
    }

    #[test]
    fn test_collection_request_replies_with_urls() {
        let upstream = FakeUpstream::default().with_channel("wallpapers", 4);
        let mut h = harness(settings(&[]), upstream);

        let handled = Provider::default()
            .handle(&BusMessage::new(GET_COLLECTION, Value::Null), &mut h.skill)
            .unwrap();
        assert!(handled);

        let sent = h.outbox.drain();
        assert_eq!(sent[0].msg_type, COLLECTION_RESPONSE);
        let urls = sent[0].data["wallpaper_collection"].as_array().unwrap();
        assert_eq!(urls.len(), 4);
        assert!(urls.iter().all(|u| u.as_str().unwrap().starts_with("https://img/wallpapers/")));
        // The GUI is left alone.
        assert!(h.gui.snapshot().fields.is_empty());
    }

    #[test]
    fn test_new_wallpaper_request_replies_with_one_url() {
        let upstream = FakeUpstream::default().with_channel("wallpapers", 2);
        let mut h = harness(settings(&[]), upstream);

        Provider::default()
            .handle(&BusMessage::new(GET_NEW_WALLPAPER, Value::Null), &mut h.skill)
            .unwrap();

        let sent = h.outbox.drain();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].msg_type, SET_WALLPAPER);
        assert_eq!(sent[0].data["provider_name"], "wallpapers");
        assert!(sent[0].data["url"].as_str().unwrap().starts_with("https://img/wallpapers/"));
        assert!(h.skill.current().is_none());
    }

    #[test]
    fn test_requests_leave_the_slideshow_on_screen() {
        let upstream = FakeUpstream::default().with_channel("wallpapers", 8);
        let mut h = harness(settings(&[]), upstream);

        h.skill.random_picture().unwrap();
        let shown = h.gui.snapshot().fields.get(IMAGE_KEY).cloned();
        let before = h.skill.selector().slideshow().pictures().to_vec();

        for _ in 0..10 {
            Provider::default()
                .handle(&BusMessage::new(GET_NEW_WALLPAPER, Value::Null), &mut h.skill)
                .unwrap();
            Provider::default()
                .handle(&BusMessage::new(GET_COLLECTION, Value::Null), &mut h.skill)
                .unwrap();
        }
        assert_eq!(h.skill.selector().slideshow().pictures(), before.as_slice());
        assert_eq!(h.skill.mode(), Mode::Slideshow);

        assert!(h.skill.set_current().unwrap());
        let applied = h.setter.calls.lock().unwrap()[0].0.clone();
        assert_eq!(Some(applied), shown);
    }

    #[test]
    fn test_unknown_messages_are_ignored() {
        let mut h = harness(settings(&[]), FakeUpstream::default());

        let handled = Provider::default()
            .handle(&BusMessage::new("mycroft.stop", Value::Null), &mut h.skill)
            .unwrap();
        assert!(!handled);
        assert!(h.outbox.drain().is_empty());
    }
}
