use std::collections::VecDeque;

use macroquad::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    Close,
    KeyDown(KeyCode),
    KeyUp(KeyCode),
}

pub trait EventSource {
    fn poll(&mut self) -> Option<HostEvent>;
}

pub struct MacroquadEvents {
    queue: VecDeque<HostEvent>,
}

impl MacroquadEvents {
    pub fn new() -> Self {
        prevent_quit();
        Self {
            queue: VecDeque::new(),
        }
    }

    pub fn gather(&mut self) {
        // Sorted so several edges in one frame replay in a stable order.
        let mut pressed: Vec<KeyCode> = get_keys_pressed().into_iter().collect();
        pressed.sort_by_key(|key| *key as u16);
        let mut released: Vec<KeyCode> = get_keys_released().into_iter().collect();
        released.sort_by_key(|key| *key as u16);

        // A key tapped within one frame shows up in both sets.
        let repressed: Vec<KeyCode> = released
            .iter()
            .copied()
            .filter(|key| pressed.contains(key) && is_key_down(*key))
            .collect();
        self.queue.extend(pressed.into_iter().map(HostEvent::KeyDown));
        self.queue.extend(released.into_iter().map(HostEvent::KeyUp));
        self.queue.extend(repressed.into_iter().map(HostEvent::KeyDown));
        if is_quit_requested() {
            self.queue.push_back(HostEvent::Close);
        }
    }
}

impl EventSource for MacroquadEvents {
    fn poll(&mut self) -> Option<HostEvent> {
        self.queue.pop_front()
    }
}

impl EventSource for VecDeque<HostEvent> {
    fn poll(&mut self) -> Option<HostEvent> {
        self.pop_front()
    }
}
