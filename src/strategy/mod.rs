pub mod volume_spike;
