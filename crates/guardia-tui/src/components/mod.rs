pub mod episode_list;
pub mod now_playing;
pub mod playlist_panel;
pub mod tag_panel;
