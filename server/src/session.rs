//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Connected players and their outbound message queues

use menagerie_common::{PlayerId, ServerMessage};
use std::collections::HashMap;
use tokio::sync::mpsc;

pub type OutboundSender = mpsc::UnboundedSender<ServerMessage>;

#[derive(Debug, Clone)]
pub struct ServerSession {
    pub player: PlayerId,
    outbound: OutboundSender,
    /// Messages delivered over this session
    pub sent: u64,
}

impl ServerSession {
    pub fn new(player: PlayerId, outbound: OutboundSender) -> Self {
        Self {
            player,
            outbound,
            sent: 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<PlayerId, ServerSession>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session, replacing any earlier one for the same player
    pub fn connect(&mut self, player: PlayerId, outbound: OutboundSender) {
        if self
            .sessions
            .insert(player, ServerSession::new(player, outbound))
            .is_some()
        {
            tracing::debug!("Replaced existing session for {}", player);
        }
    }

    pub fn disconnect(&mut self, player: PlayerId) -> bool {
        self.sessions.remove(&player).is_some()
    }

    pub fn is_connected(&self, player: PlayerId) -> bool {
        self.sessions.contains_key(&player)
    }

    pub fn get(&self, player: PlayerId) -> Option<&ServerSession> {
        self.sessions.get(&player)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Queue a message for a player
    ///
    /// A closed receiver ends the session. Returns whether the message was
    /// queued.
    pub fn send(&mut self, player: PlayerId, message: ServerMessage) -> bool {
        let Some(session) = self.sessions.get_mut(&player) else {
            return false;
        };
        if session.outbound.send(message).is_err() {
            tracing::info!("Session for {} closed, dropping it", player);
            self.sessions.remove(&player);
            return false;
        }
        session.sent += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menagerie_common::CompanionId;

    #[test]
    fn test_send_to_connected_player() {
        let mut sessions = SessionManager::new();
        let player = PlayerId::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        sessions.connect(player, tx);

        let message = ServerMessage::CompanionRemoved {
            companion: CompanionId::new(),
        };
        assert!(sessions.send(player, message.clone()));
        assert_eq!(rx.try_recv().unwrap(), message);
        assert_eq!(sessions.get(player).unwrap().sent, 1);
    }

    #[test]
    fn test_closed_receiver_drops_session() {
        let mut sessions = SessionManager::new();
        let player = PlayerId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        sessions.connect(player, tx);
        drop(rx);

        assert!(!sessions.send(player, ServerMessage::FullRoster { companions: vec![] }));
        assert!(!sessions.is_connected(player));
    }

    #[test]
    fn test_send_to_unknown_player() {
        let mut sessions = SessionManager::new();
        assert!(!sessions.send(PlayerId::new(), ServerMessage::FullRoster { companions: vec![] }));
    }
}
