pub mod abas3;
pub mod basc3;
pub mod caars2;
pub mod nab;
pub mod vineland3;
pub mod wais5;
pub mod wiat4;
pub mod wisc5;
