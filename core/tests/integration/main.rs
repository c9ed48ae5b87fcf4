mod inference;
mod materialize;
mod round_trip;
mod suggestions;
