fn main() {
  if let Err(err) = wp_valet::run() {
    wp_valet::log_error!("{:#}", err);
    std::process::exit(1);
  }
}
