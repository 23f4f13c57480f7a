// Terminal front end for the match board.

pub mod tui;
