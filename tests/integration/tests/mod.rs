mod distribution;
mod logging;
