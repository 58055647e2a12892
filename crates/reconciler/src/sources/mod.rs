pub mod sportcontent;
