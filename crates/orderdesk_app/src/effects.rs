use desk_logging::{desk_error, desk_info};
use orderdesk_bridge::HostLink;
use orderdesk_core::Effect;

use crate::console;

pub struct EffectRunner<L: HostLink> {
    link: L,
}

impl<L: HostLink> EffectRunner<L> {
    pub fn new(link: L) -> Self {
        Self { link }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Post(message) => {
                    desk_info!("{} ticket={}", message.kind(), message.ticket());
                    if let Err(err) = self.link.send(&message) {
                        desk_error!("failed to post {}: {}", message.kind(), err);
                    }
                }
                Effect::Notify(notice) => {
                    eprintln!("{}", console::render_notice(&notice));
                }
            }
        }
    }
}
