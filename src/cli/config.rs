use eyre::Result;

use super::common::Context;

pub fn print(context: &Context) -> Result<()> {
    println!("{}", context.config);
    Ok(())
}
