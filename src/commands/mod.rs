pub type CmdResult<T> = dataloaden::Result<(T, i32)>;

pub mod generate;
