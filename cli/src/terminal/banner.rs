use colored::*;

use super::print;

const BANNER: &str = r#"
                    __  ___      __   _
                   /  |/  /___ _/ /__(_)
                  / /|_/ / __ `/ //_/ /
                 / /  / / /_/ / ,< / /
                /_/  /_/\__,_/_/|_/_/
"#;

pub fn show() {
    print::print(&format!("{}", BANNER.bright_green().bold()));
}
