pub mod terminator_controller;
